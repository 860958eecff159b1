use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{BuyerProfile, Product, SellerProfile},
    traits::{MarketDbError, MarketplaceDatabase},
};

/// Self-service profile and catalog management for buyers and sellers.
pub struct ProfileApi<B> {
    db: B,
}

impl<B> Debug for ProfileApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProfileApi")
    }
}

impl<B> ProfileApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B: MarketplaceDatabase> ProfileApi<B> {
    pub async fn seller_profile(&self, seller_id: &str) -> Result<Option<SellerProfile>, MarketDbError> {
        self.db.fetch_seller_profile(seller_id).await
    }

    /// Save the seller's self-service metadata. The earnings mirror on the profile is ignored; that column is
    /// owned by the credit transaction.
    pub async fn save_seller_profile(&self, seller_id: &str, profile: &SellerProfile) -> Result<(), MarketDbError> {
        self.db.upsert_seller_profile(seller_id, profile).await?;
        debug!("🧑️ Profile saved for seller {seller_id}");
        Ok(())
    }

    pub async fn buyer_profile(&self, buyer_id: &str) -> Result<Option<BuyerProfile>, MarketDbError> {
        self.db.fetch_buyer_profile(buyer_id).await
    }

    pub async fn save_buyer_profile(&self, buyer_id: &str, profile: &BuyerProfile) -> Result<(), MarketDbError> {
        self.db.upsert_buyer_profile(buyer_id, profile).await?;
        debug!("🧑️ Profile saved for buyer {buyer_id}");
        Ok(())
    }

    /// Record the processor sub-account created during onboarding on the seller record.
    pub async fn link_payment_account(&self, seller_id: &str, account_id: &str) -> Result<(), MarketDbError> {
        self.db.set_seller_payment_account(seller_id, account_id).await?;
        info!("🧑️ Seller {seller_id} linked to payment sub-account");
        Ok(())
    }

    pub async fn add_product(&self, seller_id: &str, product: &Product) -> Result<(), MarketDbError> {
        self.db.insert_product(seller_id, product).await?;
        debug!("🛍️ Product {} added for seller {seller_id}", product.id);
        Ok(())
    }
}
