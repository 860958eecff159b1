use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Network failure calling the payment function: {0}")]
    Network(String),
    #[error("Payment function rejected the call. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Could not parse the payment function response: {0}")]
    MalformedResponse(String),
}
