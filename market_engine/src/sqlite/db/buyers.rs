use sqlx::SqliteConnection;

use crate::{db_types::BuyerProfile, traits::MarketDbError};

pub async fn fetch_profile(buyer_id: &str, conn: &mut SqliteConnection) -> Result<Option<BuyerProfile>, MarketDbError> {
    let profile =
        sqlx::query_as("SELECT name, email FROM buyers WHERE id = $1").bind(buyer_id).fetch_optional(conn).await?;
    Ok(profile)
}

pub async fn upsert_profile(
    buyer_id: &str,
    profile: &BuyerProfile,
    conn: &mut SqliteConnection,
) -> Result<(), MarketDbError> {
    sqlx::query(
        r#"
            INSERT INTO buyers (id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(buyer_id)
    .bind(&profile.name)
    .bind(&profile.email)
    .execute(conn)
    .await?;
    Ok(())
}
