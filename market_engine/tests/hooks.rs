use std::sync::{atomic::AtomicI32, Arc};

use log::*;
use market_engine::{
    db_types::{Money, NewOrder, OrderItem},
    events::{EventHandlers, EventHooks, OrderPlacedEvent},
    CheckoutApi,
};
use tokio::runtime::Runtime;

use crate::support::{
    prepare_env::{prepare_test_env, random_db_path, tear_down},
    seed_seller,
    TestProcessor,
};

mod support;

#[derive(Default, Clone)]
struct HookCalled {
    called: Arc<AtomicI32>,
}

impl HookCalled {
    pub fn called(&self) {
        let _ = self.called.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn count(&self) -> i32 {
        self.called.load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[test]
fn order_placed_hook_fires_exactly_once_per_registration() {
    let rt = Runtime::new().unwrap();
    let event = HookCalled::default();
    let event_copy = event.clone();
    rt.block_on(async move {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        seed_seller(&db, "s1", "Green Valley Farm").await;

        let mut hooks = EventHooks::default();
        hooks.on_order_placed(move |ev: OrderPlacedEvent| {
            info!("🪝️ Order {} placed; seller earnings now {}", ev.order.id, ev.seller_earnings);
            let counter = event_copy.clone();
            Box::pin(async move {
                counter.called();
            })
        });
        let handlers = EventHandlers::new(10, hooks);
        let producers = handlers.producers();
        handlers.start_handlers().await;

        let api = CheckoutApi::new(db.clone(), TestProcessor, producers);
        let items = vec![OrderItem {
            product_id: "p1".to_string(),
            name: "Organic Carrots".to_string(),
            price: Money::from_cents(299),
            quantity: 2,
            image_url: String::new(),
        }];
        let order = NewOrder::new("buyer-1", "s1", "Green Valley Farm", items, "1 Farm Lane");
        api.register_paid_order(None, order).await.expect("order registration failed");

        // Give the dispatcher a moment to deliver before asserting.
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        tear_down(db).await;
    });
    assert_eq!(event.count(), 1);
}
