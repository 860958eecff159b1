//! Concurrency tests for the seller earnings credit: many buyers completing orders against the same seller at the
//! same time must never lose an increment.
use std::sync::Arc;

use log::*;
use market_engine::{
    db_types::{Money, NewOrder, OrderItem},
    events::EventProducers,
    traits::CatalogManagement,
    CheckoutApi,
};
use tokio::runtime::Runtime;

use crate::support::{
    prepare_env::{prepare_test_env, random_db_path, tear_down},
    seed_seller,
    TestProcessor,
};

mod support;

const NUM_ORDERS: i64 = 8;

fn order_for(i: i64, amount: Money) -> NewOrder {
    let items = vec![OrderItem {
        product_id: format!("p{i}"),
        name: format!("Product {i}"),
        price: amount,
        quantity: 1,
        image_url: String::new(),
    }];
    NewOrder::new("buyer-1".to_string(), "s1".to_string(), "Green Valley Farm".to_string(), items, "1 Farm Lane".to_string())
}

#[test]
fn concurrent_orders_never_lose_an_earnings_increment() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        seed_seller(&db, "s1", "Green Valley Farm").await;
        let api = Arc::new(CheckoutApi::new(db.clone(), TestProcessor, EventProducers::default()));

        info!("🚀️ Injecting {NUM_ORDERS} concurrent orders");
        let mut handles = Vec::new();
        for i in 1..=NUM_ORDERS {
            let api = Arc::clone(&api);
            handles.push(tokio::spawn(async move {
                let amount = Money::from_cents(100 * i);
                api.register_paid_order(None, order_for(i, amount)).await.expect("order registration failed");
            }));
        }
        for handle in handles {
            handle.await.expect("order task panicked");
        }

        let expected: Money = (1..=NUM_ORDERS).map(|i| Money::from_cents(100 * i)).sum();
        let seller = db.fetch_seller("s1").await.unwrap().unwrap();
        assert_eq!(seller.earnings, expected);
        assert_eq!(db.fetch_orders_for_seller("s1").await.unwrap().len(), NUM_ORDERS as usize);
        tear_down(db).await;
    });
    info!("🚀️ test complete");
}

#[test]
fn two_simultaneous_orders_sum_exactly() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        seed_seller(&db, "s1", "Green Valley Farm").await;
        let api = Arc::new(CheckoutApi::new(db.clone(), TestProcessor, EventProducers::default()));

        let first = {
            let api = Arc::clone(&api);
            tokio::spawn(async move { api.register_paid_order(None, order_for(1, Money::from_cents(1000))).await })
        };
        let second = {
            let api = Arc::clone(&api);
            tokio::spawn(async move { api.register_paid_order(None, order_for(2, Money::from_cents(1500))).await })
        };
        first.await.unwrap().expect("first order failed");
        second.await.unwrap().expect("second order failed");

        // Starting from 0.00, a $10.00 and a $15.00 order must land on exactly $25.00. A lost update would leave
        // $10.00 or $15.00 behind.
        let seller = db.fetch_seller("s1").await.unwrap().unwrap();
        assert_eq!(seller.earnings, Money::from_cents(2500));
        tear_down(db).await;
    });
}
