use super::Queue;
use crate::types::{Order, OrderId, Price, Side, Size};

/// All resting orders for one (side, price), in time priority.
pub struct PriceLevel {
    side: Side,
    price: Price,
    orders: Queue<OrderId, Order>,
}

impl PriceLevel {
    pub fn new(side: Side, price: Price) -> Self {
        Self {
            side,
            price,
            orders: Queue::new(),
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn push_back(&mut self, order: Order) -> bool {
        debug_assert_eq!(order.side, self.side);
        debug_assert_eq!(order.price, self.price);
        self.orders.push_back(order.id, order)
    }

    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        self.orders.remove_key(&id)
    }

    /// Rewrites the size of a resting order in its current queue slot.
    pub fn amend(&mut self, id: OrderId, size: Size) -> Option<Order> {
        let amended = self.orders.get(&id)?.with_size(size);
        self.orders.replace(&id, amended)?;
        Some(amended)
    }

    pub fn total_size(&self) -> Size {
        Size(self.iter().map(|o| o.size.val()).sum())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.iter().map(|(_, order)| order)
    }
}
