//! Adapter plugging the deployed payment functions into the engine's processor boundary.

use market_engine::traits::{ClientSecret, PaymentIntentRequest, PaymentProcessor, ProcessorError};
use stripe_tools::{PaymentIntentParams, StripeApiError, StripeFunctionsApi};

#[derive(Clone)]
pub struct StripeProcessor {
    api: StripeFunctionsApi,
}

impl StripeProcessor {
    pub fn new(api: StripeFunctionsApi) -> Self {
        Self { api }
    }
}

impl PaymentProcessor for StripeProcessor {
    async fn create_payment_intent(&self, request: PaymentIntentRequest) -> Result<ClientSecret, ProcessorError> {
        let params = PaymentIntentParams {
            amount: request.amount,
            currency: request.currency,
            on_behalf_of: request.on_behalf_of,
            shipping_address: request.shipping_address,
        };
        let secret = self.api.create_payment_intent(&params).await.map_err(to_processor_error)?;
        Ok(ClientSecret(secret))
    }
}

fn to_processor_error(e: StripeApiError) -> ProcessorError {
    match e {
        StripeApiError::Network(m) => ProcessorError::Network(m),
        StripeApiError::Rejected { status, message } => ProcessorError::Rejected(format!("{status}: {message}")),
        StripeApiError::MalformedResponse(m) | StripeApiError::Initialization(m) => {
            ProcessorError::MalformedResponse(m)
        },
    }
}
