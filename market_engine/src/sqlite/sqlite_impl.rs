//! `SqliteDatabase` is the concrete marketplace store backend.
//!
//! It implements the traits defined in the [`crate::traits`] module on top of SQLite, composing the low-level
//! functions from [`super::db`] into transactions where atomicity is required.
use std::fmt::Debug;

use chrono::Duration;
use log::*;
use sqlx::SqlitePool;

use super::db::{buyers, db_url, intents, new_pool, orders, products, sellers};
use crate::{
    db_types::{
        BuyerProfile,
        Money,
        NewOrder,
        Order,
        OrderId,
        OrderItem,
        PaymentIntent,
        Product,
        Seller,
        SellerProfile,
        TrackingInfo,
    },
    traits::{CatalogManagement, MarketDbError, MarketplaceDatabase},
};

/// How many times the earnings read-modify-write is retried before giving up with `ConflictRetriesExhausted`.
const MAX_EARNINGS_RETRIES: usize = 20;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Connect to the database named by `MPG_DATABASE_URL`, or the default store.
    pub async fn new_default(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs the embedded schema migrations against this database.
    pub async fn migrate(&self) -> Result<(), MarketDbError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MarketDbError::StorageError(e.to_string()))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_seller(&self, seller_id: &str) -> Result<Option<Seller>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        sellers::fetch_seller(seller_id, &mut conn).await
    }

    async fn fetch_sellers(&self) -> Result<Vec<Seller>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        sellers::fetch_sellers(&mut conn).await
    }

    async fn fetch_products_for_seller(&self, seller_id: &str) -> Result<Vec<Product>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_for_seller(seller_id, &mut conn).await
    }

    async fn fetch_top_products_for_seller(
        &self,
        seller_id: &str,
        limit: i64,
    ) -> Result<Vec<Product>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_top_for_seller(seller_id, limit, &mut conn).await
    }

    async fn fetch_all_products(&self) -> Result<Vec<Product>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_all(&mut conn).await
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<Order>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(order_id, &mut conn).await
    }

    async fn fetch_orders_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_buyer(buyer_id, &mut conn).await
    }

    async fn fetch_orders_for_seller(&self, seller_id: &str) -> Result<Vec<Order>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_seller(seller_id, &mut conn).await
    }

    async fn fetch_seller_profile(&self, seller_id: &str) -> Result<Option<SellerProfile>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        sellers::fetch_profile(seller_id, &mut conn).await
    }

    async fn fetch_buyer_profile(&self, buyer_id: &str) -> Result<Option<BuyerProfile>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        buyers::fetch_profile(buyer_id, &mut conn).await
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn register_order(&self, order: NewOrder) -> Result<Order, MarketDbError> {
        if order.items.is_empty() {
            return Err(MarketDbError::ValidationError("An order must have at least one line item".to_string()));
        }
        let line_total: Money = order.items.iter().map(OrderItem::line_total).sum();
        if line_total != order.total_amount {
            return Err(MarketDbError::ValidationError(format!(
                "Order total {} does not match the sum of its line items {line_total}",
                order.total_amount
            )));
        }
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} for buyer {} saved. Total: {}", order.id, order.buyer_id, order.total_amount);
        Ok(order)
    }

    async fn credit_seller_earnings(&self, seller_id: &str, amount: Money) -> Result<Money, MarketDbError> {
        if amount.is_negative() {
            return Err(MarketDbError::ValidationError(format!("Cannot credit a negative amount ({amount})")));
        }
        for attempt in 1..=MAX_EARNINGS_RETRIES {
            let mut tx = self.pool.begin().await?;
            let current = sellers::fetch_earnings(seller_id, &mut tx)
                .await?
                .ok_or_else(|| MarketDbError::SellerNotFound(seller_id.to_string()))?;
            let new_earnings = current + amount;
            match sellers::compare_and_set_earnings(seller_id, current, new_earnings, &mut tx).await {
                Ok(true) => {
                    tx.commit().await?;
                    debug!("🧾️ Credited {amount} to seller {seller_id}. Earnings now {new_earnings}");
                    return Ok(new_earnings);
                },
                Ok(false) => {
                    tx.rollback().await?;
                },
                // A busy/locked write is the same situation as a lost CAS: someone else got there first.
                Err(MarketDbError::StorageError(msg)) if msg.contains("locked") || msg.contains("busy") => {
                    let _ = tx.rollback().await;
                },
                Err(e) => return Err(e),
            }
            trace!("🧾️ Earnings write conflict for seller {seller_id} (attempt {attempt}). Retrying");
            tokio::time::sleep(std::time::Duration::from_millis(5 * attempt as u64)).await;
        }
        warn!("🧾️ Earnings update for seller {seller_id} abandoned after {MAX_EARNINGS_RETRIES} conflicts");
        Err(MarketDbError::ConflictRetriesExhausted(seller_id.to_string()))
    }

    async fn insert_payment_intent(&self, seller_id: &str, amount: Money) -> Result<i64, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        intents::insert_intent(seller_id, amount, &mut conn).await
    }

    async fn confirm_payment_intent(&self, intent_id: i64) -> Result<PaymentIntent, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        intents::confirm_intent(intent_id, &mut conn).await
    }

    async fn expire_stale_intents(&self, ttl: Duration) -> Result<Vec<PaymentIntent>, MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        intents::expire_stale(ttl, &mut conn).await
    }

    async fn set_order_tracking(&self, order_id: OrderId, tracking: &TrackingInfo) -> Result<Order, MarketDbError> {
        if tracking.tracking_number.trim().is_empty() {
            return Err(MarketDbError::ValidationError("Tracking number must not be empty".to_string()));
        }
        let mut conn = self.pool.acquire().await?;
        orders::set_tracking(order_id, tracking, &mut conn)
            .await?
            .ok_or(MarketDbError::OrderNotFound(order_id))
    }

    async fn upsert_seller_profile(&self, seller_id: &str, profile: &SellerProfile) -> Result<(), MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        sellers::upsert_profile(seller_id, profile, &mut conn).await
    }

    async fn upsert_buyer_profile(&self, buyer_id: &str, profile: &BuyerProfile) -> Result<(), MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        buyers::upsert_profile(buyer_id, profile, &mut conn).await
    }

    async fn set_seller_payment_account(&self, seller_id: &str, account_id: &str) -> Result<(), MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        sellers::set_payment_account(seller_id, account_id, &mut conn).await
    }

    async fn insert_product(&self, seller_id: &str, product: &Product) -> Result<(), MarketDbError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_product(seller_id, product, &mut conn).await
    }
}
