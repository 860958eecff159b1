use market_engine::{checkout::ConfirmationOutcome, db_types::NewOrder};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/checkout/intent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentParams {
    /// Cart total in integer minor units.
    pub amount: i64,
    pub seller_id: String,
    pub shipping_address: String,
}

/// Body of `POST /api/orders`: the terminal confirmation outcome plus the order to register. Only a `completed`
/// outcome registers anything; `canceled` and `failed` leave the store untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterOrderParams {
    #[serde(flatten)]
    pub outcome: ConfirmationOutcome,
    pub intent_id: Option<i64>,
    pub order: NewOrder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrdersQuery {
    pub buyer_id: Option<String>,
    pub seller_id: Option<String>,
}

/// Body of `PUT /api/orders/{id}/tracking`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingParams {
    pub tracking_number: String,
    pub carrier_code: String,
}

/// Body of `POST /api/onboarding/account`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccountParams {
    pub seller_id: String,
    pub email: String,
}

/// Body of `POST /api/onboarding/link`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLinkParams {
    pub account_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self { success: true, message: message.into() }
    }
}
