use crate::db_types::{BuyerProfile, Order, OrderId, Product, Seller, SellerProfile};
use crate::traits::MarketDbError;

/// Read-side queries over sellers, products, orders and profiles.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_seller(&self, seller_id: &str) -> Result<Option<Seller>, MarketDbError>;

    async fn fetch_sellers(&self) -> Result<Vec<Seller>, MarketDbError>;

    async fn fetch_products_for_seller(&self, seller_id: &str) -> Result<Vec<Product>, MarketDbError>;

    /// The seller's `limit` most expensive products, by descending price. Used by the storefront feed.
    async fn fetch_top_products_for_seller(&self, seller_id: &str, limit: i64)
        -> Result<Vec<Product>, MarketDbError>;

    async fn fetch_all_products(&self) -> Result<Vec<Product>, MarketDbError>;

    /// Fetch an order with its line items populated.
    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<Order>, MarketDbError>;

    /// All orders placed by the buyer, most recent first, with line items populated.
    async fn fetch_orders_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, MarketDbError>;

    /// All orders received by the seller, most recent first, with line items populated.
    async fn fetch_orders_for_seller(&self, seller_id: &str) -> Result<Vec<Order>, MarketDbError>;

    async fn fetch_seller_profile(&self, seller_id: &str) -> Result<Option<SellerProfile>, MarketDbError>;

    async fn fetch_buyer_profile(&self, buyer_id: &str) -> Result<Option<BuyerProfile>, MarketDbError>;
}
