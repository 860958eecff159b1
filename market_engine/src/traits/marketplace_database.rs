use chrono::Duration;
use thiserror::Error;

use crate::db_types::{
    BuyerProfile,
    Money,
    NewOrder,
    Order,
    OrderId,
    PaymentIntent,
    Product,
    SellerProfile,
    TrackingInfo,
};
use crate::traits::CatalogManagement;

#[derive(Debug, Clone, Error)]
pub enum MarketDbError {
    #[error("Database error: {0}")]
    StorageError(String),
    #[error("Seller {0} does not exist")]
    SellerNotFound(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Seller {0} has no linked payment sub-account")]
    SellerNotOnboarded(String),
    #[error("Earnings update for seller {0} did not converge after repeated write conflicts")]
    ConflictRetriesExhausted(String),
    #[error("Payment intent {0} was not found")]
    IntentNotFound(i64),
    #[error("Payment intent {0} is not confirmable")]
    IntentNotConfirmable(i64),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for MarketDbError {
    fn from(e: sqlx::Error) -> Self {
        Self::StorageError(e.to_string())
    }
}

/// The write-side behaviour a storage backend must expose to act as the marketplace store.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone + CatalogManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Durably record a new order and its line items in a single atomic transaction.
    ///
    /// The store assigns the order id and the creation timestamp. This call does **not** credit the seller; the
    /// caller runs [`Self::credit_seller_earnings`] afterwards so that a half-failure always means "order exists,
    /// earnings lag" and never the reverse.
    async fn register_order(&self, order: NewOrder) -> Result<Order, MarketDbError>;

    /// Add `amount` to the seller's cumulative earnings.
    ///
    /// The implementation must read the current value and write the new one inside a conflict-detecting
    /// transaction, retrying the whole read-modify-write on conflict. A plain unconditional read-then-write loses
    /// increments under concurrent orders and is not an acceptable implementation. Returns the new earnings total.
    async fn credit_seller_earnings(&self, seller_id: &str, amount: Money) -> Result<Money, MarketDbError>;

    /// Record a processor payment intent in the `Created` state, returning the store-side intent id.
    async fn insert_payment_intent(&self, seller_id: &str, amount: Money) -> Result<i64, MarketDbError>;

    /// Move a `Created` intent to `Confirmed`. Confirming an expired or already-confirmed intent is an error.
    async fn confirm_payment_intent(&self, intent_id: i64) -> Result<PaymentIntent, MarketDbError>;

    /// Mark all `Created` intents older than `ttl` as `Expired`, returning the swept records.
    async fn expire_stale_intents(&self, ttl: Duration) -> Result<Vec<PaymentIntent>, MarketDbError>;

    /// Attach carrier and tracking number to an order. Overwrites any prior tracking info unconditionally;
    /// last write wins.
    async fn set_order_tracking(&self, order_id: OrderId, tracking: &TrackingInfo) -> Result<Order, MarketDbError>;

    /// Upsert the seller's self-service profile. Must never write the `earnings` column.
    async fn upsert_seller_profile(&self, seller_id: &str, profile: &SellerProfile) -> Result<(), MarketDbError>;

    /// Upsert the buyer's self-service profile.
    async fn upsert_buyer_profile(&self, buyer_id: &str, profile: &BuyerProfile) -> Result<(), MarketDbError>;

    /// Link the processor sub-account id to the seller record after onboarding.
    async fn set_seller_payment_account(&self, seller_id: &str, account_id: &str) -> Result<(), MarketDbError>;

    /// Add a product to the seller's catalog.
    async fn insert_product(&self, seller_id: &str, product: &Product) -> Result<(), MarketDbError>;
}
