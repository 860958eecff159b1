use mpg_common::Money;
use serde::{Deserialize, Serialize};

/// Parameters for `createPaymentIntent`. Serialized field names follow the deployed function's contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentParams {
    /// Amount in integer minor units. The function withholds a 1% platform fee off the top and routes the
    /// remainder to the sub-account.
    pub amount: Money,
    pub currency: String,
    /// The destination sub-account id.
    pub on_behalf_of: String,
    pub shipping_address: String,
}

/// A processor sub-account created for a seller during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAccount {
    pub account_id: String,
}

/// A hosted onboarding URL to open in an embedded browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLink {
    pub url: String,
}
