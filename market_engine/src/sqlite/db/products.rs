use sqlx::SqliteConnection;

use crate::{db_types::Product, traits::MarketDbError};

pub async fn fetch_for_seller(seller_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Product>, MarketDbError> {
    let products = sqlx::query_as("SELECT * FROM products WHERE seller_id = $1 ORDER BY created_at")
        .bind(seller_id)
        .fetch_all(conn)
        .await?;
    Ok(products)
}

/// The seller's most expensive products, by descending price. The storefront feed shows the top three.
pub async fn fetch_top_for_seller(
    seller_id: &str,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, MarketDbError> {
    let products = sqlx::query_as("SELECT * FROM products WHERE seller_id = $1 ORDER BY price DESC LIMIT $2")
        .bind(seller_id)
        .bind(limit)
        .fetch_all(conn)
        .await?;
    Ok(products)
}

pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<Product>, MarketDbError> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY created_at").fetch_all(conn).await?;
    Ok(products)
}

pub async fn insert_product(
    seller_id: &str,
    product: &Product,
    conn: &mut SqliteConnection,
) -> Result<(), MarketDbError> {
    sqlx::query(
        r#"
            INSERT INTO products (id, seller_id, name, description, price, image_url)
            VALUES ($1, $2, $3, $4, $5, $6);
        "#,
    )
    .bind(&product.id)
    .bind(seller_id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image_url)
    .execute(conn)
    .await?;
    Ok(())
}
