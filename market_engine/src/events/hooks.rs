use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, OrderPlacedEvent, OrderShippedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_placed_producer: Vec<EventProducer<OrderPlacedEvent>>,
    pub order_shipped_producer: Vec<EventProducer<OrderShippedEvent>>,
}

pub struct EventHandlers {
    pub on_order_placed: Option<EventHandler<OrderPlacedEvent>>,
    pub on_order_shipped: Option<EventHandler<OrderShippedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_placed = hooks.on_order_placed.map(|f| EventHandler::new(buffer_size, f));
        let on_order_shipped = hooks.on_order_shipped.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_placed, on_order_shipped }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_placed {
            result.order_placed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_shipped {
            result.order_shipped_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_placed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_order_shipped {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_placed: Option<Handler<OrderPlacedEvent>>,
    pub on_order_shipped: Option<Handler<OrderShippedEvent>>,
}

impl EventHooks {
    pub fn on_order_placed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderPlacedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_placed = Some(Arc::new(f));
        self
    }

    pub fn on_order_shipped<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderShippedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_shipped = Some(Arc::new(f));
        self
    }
}
