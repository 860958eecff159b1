use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, TrackingInfo},
    traits::MarketDbError,
};

/// Inserts a new order and its line items using the given connection. This is not atomic on its own; embed the call
/// inside a transaction and pass `&mut tx` as the connection argument.
///
/// The store assigns the order id and the creation timestamp. The items are stored in the given order.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, MarketDbError> {
    let mut inserted: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                buyer_id,
                seller_id,
                seller_name,
                total_amount,
                shipping_address
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order.buyer_id)
    .bind(order.seller_id)
    .bind(order.seller_name)
    .bind(order.total_amount)
    .bind(order.shipping_address)
    .fetch_one(&mut *conn)
    .await?;
    for item in &order.items {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, name, price, quantity, image_url)
            VALUES ($1, $2, $3, $4, $5, $6);
        "#,
        )
        .bind(inserted.id)
        .bind(&item.product_id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.quantity)
        .bind(&item.image_url)
        .execute(&mut *conn)
        .await?;
    }
    inserted.items = order.items;
    debug!("📝️ Order {} inserted with {} line items", inserted.id, inserted.items.len());
    Ok(inserted)
}

pub async fn fetch_items(order_id: OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, MarketDbError> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Fetches a single order, with line items populated.
pub async fn fetch_order(order_id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, MarketDbError> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(&mut *conn).await?;
    match order {
        Some(mut order) => {
            order.items = fetch_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

pub async fn fetch_orders_for_buyer(buyer_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, MarketDbError> {
    let orders: Vec<Order> = sqlx::query_as("SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC")
        .bind(buyer_id)
        .fetch_all(&mut *conn)
        .await?;
    with_items(orders, conn).await
}

pub async fn fetch_orders_for_seller(
    seller_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, MarketDbError> {
    let orders: Vec<Order> = sqlx::query_as("SELECT * FROM orders WHERE seller_id = $1 ORDER BY created_at DESC")
        .bind(seller_id)
        .fetch_all(&mut *conn)
        .await?;
    with_items(orders, conn).await
}

async fn with_items(mut orders: Vec<Order>, conn: &mut SqliteConnection) -> Result<Vec<Order>, MarketDbError> {
    for order in &mut orders {
        order.items = fetch_items(order.id, conn).await?;
    }
    Ok(orders)
}

/// Overwrites the order's tracking fields. Last write wins; there is no guard against double submission.
pub async fn set_tracking(
    order_id: OrderId,
    tracking: &TrackingInfo,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, MarketDbError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET tracking_number = $1, carrier_code = $2
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(&tracking.tracking_number)
    .bind(tracking.carrier.code())
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;
    match order {
        Some(mut order) => {
            order.items = fetch_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}
