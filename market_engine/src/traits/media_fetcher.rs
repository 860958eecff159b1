/// Best-effort image loading. A failed or slow fetch must never fail or block the surrounding flow, so the
/// interface cannot express an error: any failure is `None`, and callers substitute a placeholder.
#[allow(async_fn_in_trait)]
pub trait MediaFetcher {
    async fn fetch_image(&self, url: &str) -> Option<Vec<u8>>;
}

/// A fetcher that never returns image bytes. Used where images are irrelevant (tests, headless flows).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaFetcher for NoMedia {
    async fn fetch_image(&self, _url: &str) -> Option<Vec<u8>> {
        None
    }
}
