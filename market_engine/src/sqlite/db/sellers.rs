use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Money, Seller, SellerProfile},
    traits::MarketDbError,
};

pub async fn fetch_seller(seller_id: &str, conn: &mut SqliteConnection) -> Result<Option<Seller>, MarketDbError> {
    let seller =
        sqlx::query_as("SELECT * FROM sellers WHERE id = $1").bind(seller_id).fetch_optional(conn).await?;
    Ok(seller)
}

pub async fn fetch_sellers(conn: &mut SqliteConnection) -> Result<Vec<Seller>, MarketDbError> {
    let sellers = sqlx::query_as("SELECT * FROM sellers ORDER BY name").fetch_all(conn).await?;
    Ok(sellers)
}

/// The current cumulative earnings for the seller, or `None` if the seller does not exist.
pub async fn fetch_earnings(seller_id: &str, conn: &mut SqliteConnection) -> Result<Option<Money>, MarketDbError> {
    let earnings: Option<i64> =
        sqlx::query_scalar("SELECT earnings FROM sellers WHERE id = $1").bind(seller_id).fetch_optional(conn).await?;
    Ok(earnings.map(Money::from))
}

/// The write half of the earnings read-modify-write. The `WHERE earnings = $old` predicate is the conflict
/// detector: zero rows affected means another writer committed in between, and the caller must retry the whole
/// read-modify-write.
pub async fn compare_and_set_earnings(
    seller_id: &str,
    old: Money,
    new: Money,
    conn: &mut SqliteConnection,
) -> Result<bool, MarketDbError> {
    let result = sqlx::query(
        r#"
            UPDATE sellers SET earnings = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND earnings = $3;
        "#,
    )
    .bind(new)
    .bind(seller_id)
    .bind(old)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn fetch_profile(
    seller_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<SellerProfile>, MarketDbError> {
    let profile = sqlx::query_as(
        "SELECT name, description, location, image_url, email, earnings FROM sellers WHERE id = $1",
    )
    .bind(seller_id)
    .fetch_optional(conn)
    .await?;
    Ok(profile)
}

/// Upserts the seller's self-service metadata. The `earnings` column is deliberately absent from both the insert
/// column list and the update set; profile saves must never clobber it.
pub async fn upsert_profile(
    seller_id: &str,
    profile: &SellerProfile,
    conn: &mut SqliteConnection,
) -> Result<(), MarketDbError> {
    trace!("🧑️ Saving profile for seller {seller_id}");
    sqlx::query(
        r#"
            INSERT INTO sellers (id, name, description, location, image_url, email)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                location = excluded.location,
                image_url = excluded.image_url,
                email = excluded.email,
                updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(seller_id)
    .bind(&profile.name)
    .bind(&profile.description)
    .bind(&profile.location)
    .bind(&profile.image_url)
    .bind(&profile.email)
    .execute(conn)
    .await?;
    Ok(())
}

/// Links the processor sub-account created during onboarding to the seller record.
pub async fn set_payment_account(
    seller_id: &str,
    account_id: &str,
    conn: &mut SqliteConnection,
) -> Result<(), MarketDbError> {
    let result = sqlx::query("UPDATE sellers SET stripe_account_id = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(account_id)
        .bind(seller_id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(MarketDbError::SellerNotFound(seller_id.to_string()));
    }
    Ok(())
}
