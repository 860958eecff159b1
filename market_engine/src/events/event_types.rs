use serde::{Deserialize, Serialize};

use crate::db_types::{Money, Order, TrackingInfo};

/// Emitted once per successful registration, after the order has been committed and the seller credited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order: Order,
    /// The seller's cumulative earnings after this order's credit.
    pub seller_earnings: Money,
}

impl OrderPlacedEvent {
    pub fn new(order: Order, seller_earnings: Money) -> Self {
        Self { order, seller_earnings }
    }
}

/// Emitted when a seller attaches (or overwrites) tracking details on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShippedEvent {
    pub order: Order,
    pub tracking: TrackingInfo,
}

impl OrderShippedEvent {
    pub fn new(order: Order, tracking: TrackingInfo) -> Self {
        Self { order, tracking }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderPlaced(OrderPlacedEvent),
    OrderShipped(OrderShippedEvent),
}
