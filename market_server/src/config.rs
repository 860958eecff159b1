use std::env;

use chrono::Duration;
use log::*;
use stripe_tools::StripeConfig;

const DEFAULT_MPG_HOST: &str = "127.0.0.1";
const DEFAULT_MPG_PORT: u16 = 8360;
/// How long a created-but-never-confirmed payment intent may linger before the sweep marks it expired.
const DEFAULT_INTENT_TIMEOUT: Duration = Duration::hours(2);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The time before a `Created` payment intent is considered abandoned and marked as expired.
    pub intent_timeout: Duration,
    /// Configuration for the deployed payment functions.
    pub stripe_config: StripeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MPG_HOST.to_string(),
            port: DEFAULT_MPG_PORT,
            database_url: String::default(),
            intent_timeout: DEFAULT_INTENT_TIMEOUT,
            stripe_config: StripeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MPG_HOST").ok().unwrap_or_else(|| DEFAULT_MPG_HOST.into());
        let port = env::var("MPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("{s} is not a valid port for MPG_PORT. {e} Using the default, {DEFAULT_MPG_PORT}, instead.");
                    DEFAULT_MPG_PORT
                })
            })
            .unwrap_or(DEFAULT_MPG_PORT);
        let database_url = env::var("MPG_DATABASE_URL").unwrap_or_else(|_| {
            warn!("MPG_DATABASE_URL is not set. Using the default sqlite database");
            "sqlite://data/market_store.db".to_string()
        });
        let intent_timeout = env::var("MPG_INTENT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Duration::seconds)
            .unwrap_or(DEFAULT_INTENT_TIMEOUT);
        let stripe_config = StripeConfig::new_from_env_or_default();
        Self { host, port, database_url, intent_timeout, stripe_config }
    }
}
