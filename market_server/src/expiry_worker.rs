use chrono::Duration;
use log::*;
use market_engine::{db_types::PaymentIntent, traits::MarketplaceDatabase, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the stale payment intent sweep. Do not await the returned JoinHandle, as it runs indefinitely.
///
/// Intents that were created but never confirmed (an abandoned payment sheet, a client that died mid-checkout)
/// are marked `Expired` once they are older than `ttl`, after which they can no longer be confirmed.
pub fn start_expiry_worker(db: SqliteDatabase, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(60));
        info!("🕰️ Stale payment intent expiry worker started");
        loop {
            timer.tick().await;
            match db.expire_stale_intents(ttl).await {
                Ok(expired) if expired.is_empty() => trace!("🕰️ No stale payment intents"),
                Ok(expired) => {
                    info!("🕰️ {} payment intents expired", expired.len());
                    debug!("🕰️ Expired intents: {}", intent_list(&expired));
                },
                Err(e) => error!("🕰️ Error running the intent expiry job: {e}"),
            }
        }
    })
}

fn intent_list(intents: &[PaymentIntent]) -> String {
    intents
        .iter()
        .map(|i| format!("[{}] seller: {} amount: {}", i.id, i.seller_id, i.amount))
        .collect::<Vec<String>>()
        .join(", ")
}
