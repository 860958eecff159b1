use chrono::Duration;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Money, PaymentIntent},
    traits::MarketDbError,
};

/// Records a new intent in the `Created` state and returns the store-side id.
pub async fn insert_intent(seller_id: &str, amount: Money, conn: &mut SqliteConnection) -> Result<i64, MarketDbError> {
    let id: i64 = sqlx::query_scalar("INSERT INTO payment_intents (seller_id, amount) VALUES ($1, $2) RETURNING id")
        .bind(seller_id)
        .bind(amount)
        .fetch_one(conn)
        .await?;
    Ok(id)
}

pub async fn fetch_intent(intent_id: i64, conn: &mut SqliteConnection) -> Result<Option<PaymentIntent>, MarketDbError> {
    let intent =
        sqlx::query_as("SELECT * FROM payment_intents WHERE id = $1").bind(intent_id).fetch_optional(conn).await?;
    Ok(intent)
}

/// Moves a `Created` intent to `Confirmed`. An intent that has been swept by the expiry worker (or was already
/// confirmed) is not confirmable.
pub async fn confirm_intent(intent_id: i64, conn: &mut SqliteConnection) -> Result<PaymentIntent, MarketDbError> {
    let updated: Option<PaymentIntent> = sqlx::query_as(
        r#"
            UPDATE payment_intents SET status = 'Confirmed', updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND status = 'Created'
            RETURNING *;
        "#,
    )
    .bind(intent_id)
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(intent) => Ok(intent),
        None => match fetch_intent(intent_id, conn).await? {
            Some(_) => Err(MarketDbError::IntentNotConfirmable(intent_id)),
            None => Err(MarketDbError::IntentNotFound(intent_id)),
        },
    }
}

/// Marks all `Created` intents older than `ttl` as `Expired`, returning the swept records.
pub async fn expire_stale(ttl: Duration, conn: &mut SqliteConnection) -> Result<Vec<PaymentIntent>, MarketDbError> {
    let cutoff = format!("-{} seconds", ttl.num_seconds());
    let expired: Vec<PaymentIntent> = sqlx::query_as(
        r#"
            UPDATE payment_intents SET status = 'Expired', updated_at = CURRENT_TIMESTAMP
            WHERE status = 'Created' AND created_at < datetime('now', $1)
            RETURNING *;
        "#,
    )
    .bind(cutoff)
    .fetch_all(conn)
    .await?;
    if !expired.is_empty() {
        debug!("🕰️ Swept {} stale payment intents", expired.len());
    }
    Ok(expired)
}
