pub mod prepare_env;

use market_engine::{
    db_types::{Money, Product, SellerProfile},
    traits::{ClientSecret, MarketplaceDatabase, PaymentIntentRequest, PaymentProcessor, ProcessorError},
    SqliteDatabase,
};

/// A processor stand-in that accepts every create-intent request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestProcessor;

impl PaymentProcessor for TestProcessor {
    async fn create_payment_intent(&self, request: PaymentIntentRequest) -> Result<ClientSecret, ProcessorError> {
        Ok(ClientSecret(format!("pi_{}_secret_test", request.amount.value())))
    }
}

/// Creates a seller with a linked payment sub-account and two products: carrots at $2.99 and honey at $5.00.
pub async fn seed_seller(db: &SqliteDatabase, seller_id: &str, name: &str) {
    let profile = SellerProfile {
        name: name.to_string(),
        description: "Fresh produce straight from the farm".to_string(),
        location: "Los Angeles".to_string(),
        image_url: String::new(),
        email: format!("{seller_id}@example.com"),
        earnings: Money::default(),
    };
    db.upsert_seller_profile(seller_id, &profile).await.expect("Error seeding seller");
    db.set_seller_payment_account(seller_id, &format!("acct_{seller_id}"))
        .await
        .expect("Error linking payment account");
    let carrots = Product::new("p1".to_string(), "Organic Carrots".to_string(), Money::from_cents(299));
    let honey = Product::new("p2".to_string(), "Wildflower Honey".to_string(), Money::from_cents(500));
    db.insert_product(seller_id, &carrots).await.expect("Error seeding product");
    db.insert_product(seller_id, &honey).await.expect("Error seeding product");
}

pub fn carrots() -> Product {
    Product::new("p1", "Organic Carrots", Money::from_cents(299))
}

pub fn honey() -> Product {
    Product::new("p2", "Wildflower Honey", Money::from_cents(500))
}
