use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    config::StripeConfig,
    data_objects::{AccountLink, PaymentIntentParams, SubAccount},
    StripeApiError,
};

#[derive(Clone)]
pub struct StripeFunctionsApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeFunctionsApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, function: &str) -> String {
        format!("{}/{function}", self.config.functions_base_url)
    }

    /// POSTs to a callable function, wrapping the payload in the `{"data": ...}` envelope the callable protocol
    /// expects, and returns the raw JSON response body on a 2xx status.
    async fn call_function<B: Serialize>(&self, function: &str, data: &B) -> Result<Value, StripeApiError> {
        let url = self.url(function);
        trace!("Calling payment function: {url}");
        let body = serde_json::json!({ "data": data });
        let response =
            self.client.post(url).json(&body).send().await.map_err(|e| StripeApiError::Network(e.to_string()))?;
        if response.status().is_success() {
            trace!("Payment function call successful. {}", response.status());
            response.json::<Value>().await.map_err(|e| StripeApiError::MalformedResponse(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::Network(e.to_string()))?;
            Err(StripeApiError::Rejected { status, message })
        }
    }

    /// Creates a payment intent destined for the given sub-account and returns the client secret used to confirm
    /// it.
    pub async fn create_payment_intent(&self, params: &PaymentIntentParams) -> Result<String, StripeApiError> {
        debug!("Creating payment intent for {} on behalf of {}", params.amount, params.on_behalf_of);
        let response = self.call_function("createPaymentIntent", params).await?;
        let secret = extract_client_secret(&response)?;
        info!("Payment intent created on behalf of {}", params.on_behalf_of);
        Ok(secret)
    }

    /// Creates a processor sub-account for a seller during onboarding.
    pub async fn create_stripe_account(&self, email: &str) -> Result<SubAccount, StripeApiError> {
        debug!("Creating payment sub-account");
        let response = self.call_function("createStripeAccount", &serde_json::json!({ "email": email })).await?;
        let account_id = response["result"]["accountId"]
            .as_str()
            .ok_or_else(|| StripeApiError::MalformedResponse("accountId missing from createStripeAccount response".to_string()))?;
        info!("Payment sub-account created");
        Ok(SubAccount { account_id: account_id.to_string() })
    }

    /// Produces a hosted onboarding URL for the given sub-account.
    pub async fn create_account_link(&self, account_id: &str) -> Result<AccountLink, StripeApiError> {
        debug!("Creating onboarding link for sub-account");
        let response =
            self.call_function("createAccountLink", &serde_json::json!({ "accountId": account_id })).await?;
        let url = response["result"]["url"]
            .as_str()
            .ok_or_else(|| StripeApiError::MalformedResponse("url missing from createAccountLink response".to_string()))?;
        Ok(AccountLink { url: url.to_string() })
    }
}

/// The callable protocol wraps the function result in a `result` field, and `createPaymentIntent` itself returns
/// `{ "result": { "client_secret": ... } }`, so the secret sits two levels deep.
fn extract_client_secret(response: &Value) -> Result<String, StripeApiError> {
    response["result"]["result"]["client_secret"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            StripeApiError::MalformedResponse("client_secret missing from createPaymentIntent response".to_string())
        })
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::data_objects::PaymentIntentParams;
    use mpg_common::Money;

    #[test]
    fn client_secret_sits_two_levels_deep() {
        let response = json!({
            "result": {
                "result": {
                    "client_secret": "pi_3P_secret_abc123"
                }
            }
        });
        assert_eq!(extract_client_secret(&response).unwrap(), "pi_3P_secret_abc123");
    }

    #[test]
    fn missing_nesting_is_a_malformed_response() {
        // A single level of nesting is not enough.
        let single = json!({ "result": { "client_secret": "pi_3P_secret_abc123" } });
        assert!(matches!(extract_client_secret(&single), Err(StripeApiError::MalformedResponse(_))));
        let empty = json!({});
        assert!(matches!(extract_client_secret(&empty), Err(StripeApiError::MalformedResponse(_))));
        let wrong_type = json!({ "result": { "result": { "client_secret": 42 } } });
        assert!(matches!(extract_client_secret(&wrong_type), Err(StripeApiError::MalformedResponse(_))));
    }

    #[test]
    fn intent_params_serialize_with_the_function_contract_field_names() {
        let params = PaymentIntentParams {
            amount: Money::from_cents(1098),
            currency: "usd".to_string(),
            on_behalf_of: "acct_123".to_string(),
            shipping_address: "1 Farm Lane".to_string(),
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["amount"], 1098);
        assert_eq!(value["currency"], "usd");
        assert_eq!(value["onBehalfOf"], "acct_123");
        assert_eq!(value["shippingAddress"], "1 Farm Lane");
    }
}
