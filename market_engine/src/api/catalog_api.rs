use std::{collections::HashMap, fmt::Debug};

use futures_util::future::join_all;
use log::*;

use crate::{
    db_types::{Order, OrderId, Product, Seller},
    traits::{CatalogManagement, MarketDbError, MediaFetcher},
};

/// How many products each seller card in the storefront feed carries.
const TOP_PRODUCTS_PER_SELLER: i64 = 3;

/// Read-side catalog queries, including the storefront feed with its fan-out over sellers, products and images.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ImageKey {
    Seller(String),
    Product(String),
}

impl<B: CatalogManagement> CatalogApi<B> {
    /// The storefront feed: every seller, each with its top products and best-effort images.
    ///
    /// The fan-out runs level by level. Products are fetched with one concurrent query per seller and the whole
    /// level is joined before images start. Image fetches for all sellers and products then run as a single
    /// concurrent batch, collected into an accumulator keyed by id. A failed image fetch leaves the image `None`;
    /// it never fails or delays the feed beyond its own await.
    pub async fn seller_feed<M: MediaFetcher>(&self, media: &M) -> Result<Vec<Seller>, MarketDbError> {
        let mut sellers = self.db.fetch_sellers().await?;
        let results = join_all(
            sellers.iter().map(|seller| self.db.fetch_top_products_for_seller(&seller.id, TOP_PRODUCTS_PER_SELLER)),
        )
        .await;
        let mut products_by_seller: HashMap<String, Vec<Product>> = HashMap::with_capacity(sellers.len());
        for (seller, products) in sellers.iter().zip(results) {
            products_by_seller.insert(seller.id.clone(), products?);
        }
        for seller in &mut sellers {
            seller.products = products_by_seller.remove(&seller.id).unwrap_or_default();
        }

        let mut jobs: Vec<(ImageKey, String)> = Vec::new();
        for seller in &sellers {
            if !seller.image_url.is_empty() {
                jobs.push((ImageKey::Seller(seller.id.clone()), seller.image_url.clone()));
            }
            for product in &seller.products {
                if !product.image_url.is_empty() {
                    jobs.push((ImageKey::Product(product.id.clone()), product.image_url.clone()));
                }
            }
        }
        let fetched = join_all(jobs.into_iter().map(|(key, url)| async move {
            let bytes = media.fetch_image(&url).await;
            (key, bytes)
        }))
        .await;
        let mut images: HashMap<ImageKey, Vec<u8>> =
            fetched.into_iter().filter_map(|(key, bytes)| bytes.map(|b| (key, b))).collect();
        for seller in &mut sellers {
            seller.image = images.remove(&ImageKey::Seller(seller.id.clone()));
            for product in &mut seller.products {
                product.image = images.remove(&ImageKey::Product(product.id.clone()));
            }
        }
        trace!("🛍️ Storefront feed assembled for {} sellers", sellers.len());
        Ok(sellers)
    }

    pub async fn seller(&self, seller_id: &str) -> Result<Option<Seller>, MarketDbError> {
        self.db.fetch_seller(seller_id).await
    }

    pub async fn products_for_seller(&self, seller_id: &str) -> Result<Vec<Product>, MarketDbError> {
        self.db.fetch_products_for_seller(seller_id).await
    }

    pub async fn order(&self, order_id: OrderId) -> Result<Option<Order>, MarketDbError> {
        self.db.fetch_order(order_id).await
    }

    pub async fn orders_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, MarketDbError> {
        self.db.fetch_orders_for_buyer(buyer_id).await
    }

    pub async fn orders_for_seller(&self, seller_id: &str) -> Result<Vec<Order>, MarketDbError> {
        self.db.fetch_orders_for_seller(seller_id).await
    }
}
