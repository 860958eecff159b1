use log::*;

#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Base URL of the deployed callable functions, e.g. `https://us-central1-myproject.cloudfunctions.net`.
    pub functions_base_url: String,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self { functions_base_url: "https://us-central1-example.cloudfunctions.net".to_string() }
    }
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let functions_base_url = std::env::var("MPG_PAYMENT_FUNCTIONS_URL").unwrap_or_else(|_| {
            warn!("MPG_PAYMENT_FUNCTIONS_URL not set, using (probably useless) default");
            StripeConfig::default().functions_base_url
        });
        Self { functions_base_url }
    }
}
