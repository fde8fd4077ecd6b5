use crate::types::{Order, OrderId};
use serde::{Deserialize, Serialize};

/// A single book mutation as delivered by a feed handler or matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderEvent {
    Add(Order),
    Remove { id: OrderId },
    /// A size of zero or below cancels the order.
    Modify { id: OrderId, size: i64 },
}

impl OrderEvent {
    pub fn id(&self) -> OrderId {
        match self {
            OrderEvent::Add(order) => order.id,
            OrderEvent::Remove { id } | OrderEvent::Modify { id, .. } => *id,
        }
    }
}

impl From<Order> for OrderEvent {
    fn from(order: Order) -> Self {
        OrderEvent::Add(order)
    }
}
