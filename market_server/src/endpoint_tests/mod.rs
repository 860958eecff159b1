use actix_web::{test, web, App};
use market_engine::{
    db_types::{Money, NewOrder, Order, OrderItem, SellerProfile},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{CatalogManagement, MarketplaceDatabase},
    CatalogApi,
    CheckoutApi,
    ProfileApi,
    ShippingApi,
    SqliteDatabase,
};
use stripe_tools::{StripeConfig, StripeFunctionsApi};

use crate::{integrations::stripe::StripeProcessor, media::HttpMediaFetcher, routes};

async fn setup_db() -> SqliteDatabase {
    prepare_test_env(&random_db_path()).await
}

async fn seed_seller(db: &SqliteDatabase, seller_id: &str, name: &str, onboarded: bool) {
    let profile = SellerProfile {
        name: name.to_string(),
        description: "Fresh produce straight from the farm".to_string(),
        location: "Los Angeles".to_string(),
        image_url: String::new(),
        email: format!("{seller_id}@example.com"),
        earnings: Money::default(),
    };
    db.upsert_seller_profile(seller_id, &profile).await.expect("Error seeding seller");
    if onboarded {
        db.set_seller_payment_account(seller_id, &format!("acct_{seller_id}"))
            .await
            .expect("Error linking payment account");
    }
}

fn app_for(
    db: SqliteDatabase,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let stripe_api = StripeFunctionsApi::new(StripeConfig::default()).expect("Error creating stripe client");
    App::new()
        .app_data(web::Data::new(CheckoutApi::new(
            db.clone(),
            StripeProcessor::new(stripe_api.clone()),
            EventProducers::default(),
        )))
        .app_data(web::Data::new(CatalogApi::new(db.clone())))
        .app_data(web::Data::new(ProfileApi::new(db.clone())))
        .app_data(web::Data::new(ShippingApi::new(db.clone(), EventProducers::default())))
        .app_data(web::Data::new(stripe_api))
        .app_data(web::Data::new(HttpMediaFetcher::new()))
        .service(routes::health)
        .service(routes::api_scope())
}

fn honey_order() -> NewOrder {
    let items = vec![OrderItem {
        product_id: "p2".to_string(),
        name: "Wildflower Honey".to_string(),
        price: Money::from_cents(500),
        quantity: 2,
        image_url: String::new(),
    }];
    NewOrder::new("buyer-1", "s1", "Green Valley Farm", items, "1 Farm Lane")
}

#[actix_web::test]
async fn health_check() {
    let db = setup_db().await;
    let app = test::init_service(app_for(db)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn intent_creation_is_guarded() {
    let db = setup_db().await;
    seed_seller(&db, "s2", "Riverside Fishing Co.", false).await;
    let app = test::init_service(app_for(db)).await;

    // Seller exists but is not onboarded with the processor.
    let req = test::TestRequest::post()
        .uri("/api/checkout/intent")
        .set_json(serde_json::json!({ "amount": 500, "seller_id": "s2", "shipping_address": "1 Pier Road" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 412);

    // Unknown seller.
    let req = test::TestRequest::post()
        .uri("/api/checkout/intent")
        .set_json(serde_json::json!({ "amount": 500, "seller_id": "nobody", "shipping_address": "1 Pier Road" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    // Zero amount never reaches the processor.
    let req = test::TestRequest::post()
        .uri("/api/checkout/intent")
        .set_json(serde_json::json!({ "amount": 0, "seller_id": "s2", "shipping_address": "1 Pier Road" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn completed_checkout_registers_the_order() {
    let db = setup_db().await;
    seed_seller(&db, "s1", "Green Valley Farm", true).await;
    let app = test::init_service(app_for(db.clone())).await;

    let body = serde_json::json!({ "outcome": "completed", "intent_id": null, "order": honey_order() });
    let req = test::TestRequest::post().uri("/api/orders").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    let order: Order = test::read_body_json(resp).await;
    assert_eq!(order.total_amount, Money::from_cents(1000));

    let req = test::TestRequest::get().uri(&format!("/api/orders/{}", order.id.0)).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let fetched: Order = test::read_body_json(resp).await;
    assert_eq!(fetched.items.len(), 1);

    let req = test::TestRequest::get().uri("/api/orders?seller_id=s1").to_request();
    let resp = test::call_service(&app, req).await;
    let listed: Vec<Order> = test::read_body_json(resp).await;
    assert_eq!(listed.len(), 1);

    let seller = db.fetch_seller("s1").await.unwrap().unwrap();
    assert_eq!(seller.earnings, Money::from_cents(1000));
}

#[actix_web::test]
async fn canceled_checkout_registers_nothing() {
    let db = setup_db().await;
    seed_seller(&db, "s1", "Green Valley Farm", true).await;
    let app = test::init_service(app_for(db.clone())).await;

    let body = serde_json::json!({ "outcome": "canceled", "intent_id": null, "order": honey_order() });
    let req = test::TestRequest::post().uri("/api/orders").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);

    assert!(db.fetch_orders_for_seller("s1").await.unwrap().is_empty());
    let seller = db.fetch_seller("s1").await.unwrap().unwrap();
    assert_eq!(seller.earnings, Money::default());
}

#[actix_web::test]
async fn failed_checkout_surfaces_the_reason() {
    let db = setup_db().await;
    seed_seller(&db, "s1", "Green Valley Farm", true).await;
    let app = test::init_service(app_for(db.clone())).await;

    let body = serde_json::json!({
        "outcome": "failed",
        "reason": "card declined",
        "intent_id": null,
        "order": honey_order(),
    });
    let req = test::TestRequest::post().uri("/api/orders").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 402);
    assert!(db.fetch_orders_for_seller("s1").await.unwrap().is_empty());
}

#[actix_web::test]
async fn tracking_round_trip() {
    let db = setup_db().await;
    seed_seller(&db, "s1", "Green Valley Farm", true).await;
    let app = test::init_service(app_for(db.clone())).await;

    let body = serde_json::json!({ "outcome": "completed", "intent_id": null, "order": honey_order() });
    let req = test::TestRequest::post().uri("/api/orders").set_json(&body).to_request();
    let order: Order = test::read_body_json(test::call_service(&app, req).await).await;

    // Before the seller ships, tracking is null: a valid, displayable state.
    let req = test::TestRequest::get().uri(&format!("/api/orders/{}/tracking", order.id.0)).to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["tracking"].is_null());

    let req = test::TestRequest::put()
        .uri(&format!("/api/orders/{}/tracking", order.id.0))
        .set_json(serde_json::json!({ "tracking_number": "9400110200793123456781", "carrier_code": "USPS" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get().uri(&format!("/api/orders/{}/tracking", order.id.0)).to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["tracking"]["carrier"], "USPS");
    assert_eq!(body["tracking"]["tracking_number"], "9400110200793123456781");
}

#[actix_web::test]
async fn profile_saves_keep_earnings_intact() {
    let db = setup_db().await;
    seed_seller(&db, "s1", "Green Valley Farm", true).await;
    db.credit_seller_earnings("s1", Money::from_cents(750)).await.unwrap();
    let app = test::init_service(app_for(db.clone())).await;

    let body = serde_json::json!({
        "name": "Green Valley Farm & Orchard",
        "description": "Organic produce and fruit",
        "location": "Los Angeles",
        "image_url": "",
        "email": "farm@example.com",
        "earnings": 9_999_999,
    });
    let req = test::TestRequest::put().uri("/api/sellers/s1/profile").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get().uri("/api/sellers/s1/profile").to_request();
    let resp = test::call_service(&app, req).await;
    let profile: SellerProfile = test::read_body_json(resp).await;
    assert_eq!(profile.name, "Green Valley Farm & Orchard");
    assert_eq!(profile.earnings, Money::from_cents(750));
}
