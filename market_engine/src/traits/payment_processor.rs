use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::Money;

/// Failures crossing the payment processor boundary. The create-intent call traverses two hops (our callable
/// endpoint, then the processor itself), and the caller needs to tell the failure modes apart: a network failure is
/// transient and safe to retry, a rejection is not retryable without correction, and a malformed response means the
/// endpoint contract is broken.
#[derive(Debug, Clone, Error)]
pub enum ProcessorError {
    #[error("Network failure calling the payment endpoint: {0}")]
    Network(String),
    #[error("The payment processor rejected the request: {0}")]
    Rejected(String),
    #[error("Malformed processor response: {0}")]
    MalformedResponse(String),
}

/// Opaque token that lets the client confirm a specific payment intent without ever seeing the seller's processor
/// credentials. Redacted in debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSecret(pub String);

impl ClientSecret {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientSecret(****)")
    }
}

impl Display for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("****")
    }
}

/// A create-intent request against the processor, destined for a specific seller sub-account. The platform fee
/// (1% of `amount`) is withheld by the endpoint; the remainder is routed to the sub-account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in integer minor units.
    pub amount: Money,
    pub currency: String,
    /// The seller's processor sub-account id.
    pub on_behalf_of: String,
    pub shipping_address: String,
}

/// Boundary to the payment processor's create-intent endpoint.
#[allow(async_fn_in_trait)]
pub trait PaymentProcessor {
    async fn create_payment_intent(&self, request: PaymentIntentRequest) -> Result<ClientSecret, ProcessorError>;
}
