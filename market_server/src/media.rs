use std::time::Duration;

use log::debug;
use market_engine::traits::MediaFetcher;
use reqwest::Client;

/// HTTP-backed image loading for the storefront feed. Strictly best-effort: a timeout, a non-2xx status or a
/// broken body all degrade to `None`, and the caller renders a placeholder.
#[derive(Clone)]
pub struct HttpMediaFetcher {
    client: Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        let client = Client::builder().timeout(Duration::from_secs(5)).build().unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaFetcher for HttpMediaFetcher {
    async fn fetch_image(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("🖼️ Image fetch failed for {url}: {e}");
                return None;
            },
        };
        if !response.status().is_success() {
            debug!("🖼️ Image fetch for {url} returned {}", response.status());
            return None;
        }
        response.bytes().await.ok().map(|bytes| bytes.to_vec())
    }
}
