use chrono::Duration;
use market_engine::{
    cart::Cart,
    checkout::ConfirmationOutcome,
    db_types::{Carrier, Money, NewOrder, OrderItem, SellerProfile, TrackingInfo},
    events::EventProducers,
    traits::{CatalogManagement, MarketDbError, MarketplaceDatabase},
    CheckoutApi,
    CheckoutError,
    ShippingApi,
    SqliteDatabase,
};
use tokio::runtime::Runtime;

use crate::support::{
    carrots,
    honey,
    prepare_env::{prepare_test_env, random_db_path, tear_down},
    seed_seller,
    TestProcessor,
};

mod support;

async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    let db = prepare_test_env(&url).await;
    seed_seller(&db, "s1", "Green Valley Farm").await;
    db
}

fn checkout_api(db: &SqliteDatabase) -> CheckoutApi<SqliteDatabase, TestProcessor> {
    CheckoutApi::new(db.clone(), TestProcessor, EventProducers::default())
}

#[test]
fn completed_checkout_registers_the_order_and_credits_the_seller() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let db = setup().await;
        let api = checkout_api(&db);
        let mut cart = Cart::new();
        cart.add(carrots(), 2).unwrap();
        cart.add(honey(), 1).unwrap();
        assert_eq!(cart.total_price(), Money::from_cents(1098));

        let mut prepared =
            api.create_payment_intent(cart.total_price(), "s1", "1 Farm Lane").await.expect("intent creation failed");
        assert!(prepared.client_secret.as_str().contains("secret"));
        prepared.confirmation.present_sheet().unwrap();
        prepared.confirmation.resolve(ConfirmationOutcome::Completed).unwrap();

        let order = api
            .settle(&prepared.confirmation, &mut cart, "buyer-1", "s1", "Green Valley Farm", "1 Farm Lane")
            .await
            .expect("settlement failed")
            .expect("a completed confirmation must produce an order");

        assert_eq!(order.total_amount, Money::from_cents(1098));
        assert_eq!(order.items.len(), 2);
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Money::default());

        let seller = db.fetch_seller("s1").await.unwrap().unwrap();
        assert_eq!(seller.earnings, Money::from_cents(1098));

        let fetched = db.fetch_order(order.id).await.unwrap().expect("order must be retrievable");
        assert_eq!(fetched.total_amount, Money::from_cents(1098));
        assert_eq!(fetched.items.len(), 2);
        assert_eq!(fetched.items[0].product_id, "p1");
        assert_eq!(fetched.items[0].quantity, 2);
        tear_down(db).await;
    });
}

#[test]
fn canceled_confirmation_never_reaches_the_registrar() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let db = setup().await;
        let api = checkout_api(&db);
        let mut cart = Cart::new();
        cart.add(carrots(), 1).unwrap();

        let mut prepared = api.create_payment_intent(cart.total_price(), "s1", "1 Farm Lane").await.unwrap();
        prepared.confirmation.present_sheet().unwrap();
        prepared.confirmation.resolve(ConfirmationOutcome::Canceled).unwrap();

        let result = api
            .settle(&prepared.confirmation, &mut cart, "buyer-1", "s1", "Green Valley Farm", "1 Farm Lane")
            .await
            .expect("a canceled confirmation is not an error");
        assert!(result.is_none());
        assert_eq!(cart.total_price(), Money::from_cents(299));
        assert!(db.fetch_orders_for_buyer("buyer-1").await.unwrap().is_empty());
        let seller = db.fetch_seller("s1").await.unwrap().unwrap();
        assert_eq!(seller.earnings, Money::default());
        tear_down(db).await;
    });
}

#[test]
fn failed_confirmation_keeps_the_cart_for_a_retry() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let db = setup().await;
        let api = checkout_api(&db);
        let mut cart = Cart::new();
        cart.add(honey(), 2).unwrap();

        let mut prepared = api.create_payment_intent(cart.total_price(), "s1", "1 Farm Lane").await.unwrap();
        prepared.confirmation.present_sheet().unwrap();
        prepared.confirmation.resolve(ConfirmationOutcome::Failed("card declined".to_string())).unwrap();

        let err = api
            .settle(&prepared.confirmation, &mut cart, "buyer-1", "s1", "Green Valley Farm", "1 Farm Lane")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentFailed(reason) if reason == "card declined"));
        assert_eq!(cart.total_price(), Money::from_cents(1000));
        assert!(db.fetch_orders_for_buyer("buyer-1").await.unwrap().is_empty());
        tear_down(db).await;
    });
}

#[test]
fn settling_before_a_terminal_state_is_rejected() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let db = setup().await;
        let api = checkout_api(&db);
        let mut cart = Cart::new();
        cart.add(carrots(), 1).unwrap();

        let mut prepared = api.create_payment_intent(cart.total_price(), "s1", "1 Farm Lane").await.unwrap();
        let err = api
            .settle(&prepared.confirmation, &mut cart, "buyer-1", "s1", "Green Valley Farm", "1 Farm Lane")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ConfirmationPending));

        prepared.confirmation.present_sheet().unwrap();
        let err = api
            .settle(&prepared.confirmation, &mut cart, "buyer-1", "s1", "Green Valley Farm", "1 Farm Lane")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ConfirmationPending));
        tear_down(db).await;
    });
}

#[test]
fn intent_creation_requires_an_onboarded_seller() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        // A seller that exists but never completed payment onboarding.
        let profile = SellerProfile {
            name: "Riverside Fishing Co.".to_string(),
            description: String::new(),
            location: "New York".to_string(),
            image_url: String::new(),
            email: "fish@example.com".to_string(),
            earnings: Money::default(),
        };
        db.upsert_seller_profile("s2", &profile).await.unwrap();
        let api = checkout_api(&db);

        let err = api.create_payment_intent(Money::from_cents(500), "s2", "1 Pier Road").await.unwrap_err();
        assert!(matches!(err, CheckoutError::Database(MarketDbError::SellerNotOnboarded(_))));
        let err = api.create_payment_intent(Money::from_cents(500), "nobody", "1 Pier Road").await.unwrap_err();
        assert!(matches!(err, CheckoutError::Database(MarketDbError::SellerNotFound(_))));
        tear_down(db).await;
    });
}

#[test]
fn a_failed_earnings_credit_is_reported_as_a_partial_commit() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        let api = checkout_api(&db);
        // The order references a seller that does not exist, so the credit step must fail after the order row
        // has been committed.
        let items = vec![OrderItem {
            product_id: "p1".to_string(),
            name: "Organic Carrots".to_string(),
            price: Money::from_cents(299),
            quantity: 1,
            image_url: String::new(),
        }];
        let order = NewOrder::new("buyer-1", "ghost-seller", "Ghost Farm", items, "1 Farm Lane");

        let err = api.register_paid_order(None, order).await.unwrap_err();
        let order_id = match err {
            CheckoutError::EarningsUpdateFailed { order_id, .. } => order_id,
            e => panic!("Expected EarningsUpdateFailed, got {e}"),
        };
        // The order exists and is retrievable; only the earnings lag.
        let order = db.fetch_order(order_id).await.unwrap().expect("order must exist after a partial commit");
        assert_eq!(order.total_amount, Money::from_cents(299));
        tear_down(db).await;
    });
}

#[test]
fn mismatched_order_totals_are_rejected() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let db = setup().await;
        let items = vec![OrderItem {
            product_id: "p1".to_string(),
            name: "Organic Carrots".to_string(),
            price: Money::from_cents(299),
            quantity: 2,
            image_url: String::new(),
        }];
        let mut order = NewOrder::new("buyer-1", "s1", "Green Valley Farm", items, "1 Farm Lane");
        order.total_amount = Money::from_cents(100);
        let err = db.register_order(order).await.unwrap_err();
        assert!(matches!(err, MarketDbError::ValidationError(_)));
        tear_down(db).await;
    });
}

#[test]
fn tracking_is_last_write_wins() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let db = setup().await;
        let api = checkout_api(&db);
        let items = vec![OrderItem {
            product_id: "p2".to_string(),
            name: "Wildflower Honey".to_string(),
            price: Money::from_cents(500),
            quantity: 1,
            image_url: String::new(),
        }];
        let order = NewOrder::new("buyer-1", "s1", "Green Valley Farm", items, "1 Farm Lane");
        let order = api.register_paid_order(None, order).await.unwrap();

        let shipping = ShippingApi::new(db.clone(), EventProducers::default());
        // Nothing recorded yet: the order is waiting to be shipped.
        assert!(shipping.tracking_for_order(order.id).await.unwrap().is_none());

        let first = TrackingInfo { tracking_number: "1Z999AA10123456784".to_string(), carrier: Carrier::Ups };
        shipping.set_tracking(order.id, first).await.unwrap();
        let second = TrackingInfo { tracking_number: "9400110200793123456781".to_string(), carrier: Carrier::Usps };
        shipping.set_tracking(order.id, second.clone()).await.unwrap();

        let recorded = shipping.tracking_for_order(order.id).await.unwrap().expect("tracking must be recorded");
        assert_eq!(recorded, second);

        let err = shipping
            .set_tracking(order.id, TrackingInfo { tracking_number: "  ".to_string(), carrier: Carrier::Dhl })
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDbError::ValidationError(_)));
        tear_down(db).await;
    });
}

#[test]
fn profile_saves_never_clobber_earnings() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let db = setup().await;
        db.credit_seller_earnings("s1", Money::from_cents(500)).await.unwrap();

        let mut profile = db.fetch_seller_profile("s1").await.unwrap().unwrap();
        assert_eq!(profile.earnings, Money::from_cents(500));
        profile.name = "Green Valley Farm & Orchard".to_string();
        // A stale or tampered mirror value must be ignored by the save path.
        profile.earnings = Money::from_cents(999_999);
        db.upsert_seller_profile("s1", &profile).await.unwrap();

        let seller = db.fetch_seller("s1").await.unwrap().unwrap();
        assert_eq!(seller.name, "Green Valley Farm & Orchard");
        assert_eq!(seller.earnings, Money::from_cents(500));
        tear_down(db).await;
    });
}

#[test]
fn stale_intents_expire_and_cannot_be_confirmed() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let db = setup().await;
        let stale = db.insert_payment_intent("s1", Money::from_cents(1000)).await.unwrap();
        let fresh = db.insert_payment_intent("s1", Money::from_cents(2000)).await.unwrap();
        sqlx::query("UPDATE payment_intents SET created_at = datetime('now', '-3 hours') WHERE id = $1")
            .bind(stale)
            .execute(db.pool())
            .await
            .unwrap();

        let swept = db.expire_stale_intents(Duration::hours(2)).await.unwrap();
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].id, stale);

        let err = db.confirm_payment_intent(stale).await.unwrap_err();
        assert!(matches!(err, MarketDbError::IntentNotConfirmable(_)));
        // The fresh intent is untouched and still confirmable.
        db.confirm_payment_intent(fresh).await.unwrap();
        tear_down(db).await;
    });
}
