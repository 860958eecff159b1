use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId, TrackingInfo},
    events::{EventProducers, OrderShippedEvent},
    traits::{MarketDbError, MarketplaceDatabase},
};

/// Seller-side shipment tracking: attach a carrier and tracking number to a placed order, and read it back.
pub struct ShippingApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ShippingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShippingApi")
    }
}

impl<B> ShippingApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B: MarketplaceDatabase> ShippingApi<B> {
    /// Attach tracking details to the order. Overwrites any prior tracking info unconditionally; last write wins.
    pub async fn set_tracking(&self, order_id: OrderId, tracking: TrackingInfo) -> Result<Order, MarketDbError> {
        let order = self.db.set_order_tracking(order_id, &tracking).await?;
        info!("📦️ Order {order_id} tracking set to {} ({})", tracking.tracking_number, tracking.carrier);
        for emitter in &self.producers.order_shipped_producer {
            trace!("🔄️📦️ Notifying order shipped hook subscribers");
            let event = OrderShippedEvent::new(order.clone(), tracking.clone());
            emitter.publish_event(event).await;
        }
        Ok(order)
    }

    /// The tracking details recorded on the order. `None` is a valid, displayable state: the order is still
    /// waiting to be shipped.
    pub async fn tracking_for_order(&self, order_id: OrderId) -> Result<Option<TrackingInfo>, MarketDbError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(MarketDbError::OrderNotFound(order_id))?;
        Ok(order.tracking())
    }
}
