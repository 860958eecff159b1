use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use market_engine::{
    db_types::OrderId,
    traits::{MarketDbError, ProcessorError},
    CheckoutError,
};
use stripe_tools::StripeApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The seller has not completed payment onboarding. {0}")]
    NotOnboarded(String),
    #[error("Payment failed. {0}")]
    PaymentFailed(String),
    #[error("The payment endpoint could not be reached or gave a broken response. {0}")]
    PaymentUnavailable(String),
    #[error("The request conflicts with the current state. {0}")]
    Conflict(String),
    /// The order was durably recorded but the seller earnings credit failed. The order must not be re-created;
    /// only the credit step may be retried, or the order flagged for reconciliation.
    #[error("Order {order_id} was created but the earnings update failed. {reason}")]
    PartialCommit { order_id: OrderId, reason: String },
    #[error("The store is too contended to complete the write. {0}")]
    StorageContended(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::NotOnboarded(_) => StatusCode::PRECONDITION_FAILED,
            Self::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
            Self::PaymentUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PartialCommit { .. } => StatusCode::BAD_GATEWAY,
            Self::StorageContended(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            // A partial commit must be distinguishable from "order never created", so the order id rides along.
            Self::PartialCommit { order_id, reason } => serde_json::json!({
                "error": "partial_commit",
                "order_id": order_id,
                "reason": reason,
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

impl From<MarketDbError> for ServerError {
    fn from(e: MarketDbError) -> Self {
        match e {
            MarketDbError::SellerNotFound(_) | MarketDbError::OrderNotFound(_) | MarketDbError::IntentNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            MarketDbError::SellerNotOnboarded(_) => Self::NotOnboarded(e.to_string()),
            MarketDbError::IntentNotConfirmable(_) => Self::Conflict(e.to_string()),
            MarketDbError::ConflictRetriesExhausted(_) => Self::StorageContended(e.to_string()),
            MarketDbError::ValidationError(_) => Self::InvalidRequestBody(e.to_string()),
            MarketDbError::StorageError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart | CheckoutError::InvalidAmount(_) => Self::InvalidRequestBody(e.to_string()),
            CheckoutError::Processor(p) => match p {
                ProcessorError::Rejected(reason) => Self::PaymentFailed(reason),
                ProcessorError::Network(m) | ProcessorError::MalformedResponse(m) => Self::PaymentUnavailable(m),
            },
            CheckoutError::Database(db) => db.into(),
            CheckoutError::PaymentFailed(reason) => Self::PaymentFailed(reason),
            CheckoutError::ConfirmationPending => Self::Conflict(e.to_string()),
            CheckoutError::EarningsUpdateFailed { order_id, reason } => Self::PartialCommit { order_id, reason },
        }
    }
}

impl From<StripeApiError> for ServerError {
    fn from(e: StripeApiError) -> Self {
        match e {
            StripeApiError::Initialization(m) => Self::InitializeError(m),
            StripeApiError::Network(m) => Self::PaymentUnavailable(m),
            StripeApiError::Rejected { status, message } => Self::PaymentFailed(format!("{status}: {message}")),
            StripeApiError::MalformedResponse(m) => Self::PaymentUnavailable(m),
        }
    }
}
