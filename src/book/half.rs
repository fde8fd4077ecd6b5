use super::PriceLevel;
use crate::types::{Order, OrderId, Price, Side, Size};
use std::cmp::Reverse;
use std::collections::{BTreeMap, btree_map};

/// Map key that orders a side's levels best-first.
pub trait LevelKey: Ord + Copy {
    fn from_price(price: Price) -> Self;
}

/// Offers: lowest price first.
impl LevelKey for Price {
    fn from_price(price: Price) -> Self {
        price
    }
}

/// Bids: highest price first.
impl LevelKey for Reverse<Price> {
    fn from_price(price: Price) -> Self {
        Reverse(price)
    }
}

/// One side of the book: price levels keyed best-first, empty levels never kept.
pub struct HalfBook<K: LevelKey> {
    side: Side,
    levels: BTreeMap<K, PriceLevel>,
    orders: usize,
}

impl<K: LevelKey> HalfBook<K> {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            orders: 0,
        }
    }

    /// Number of resting orders across every level.
    pub fn len(&self) -> usize {
        self.orders
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn best_price(&self) -> Option<Price> {
        self.levels.values().next().map(PriceLevel::price)
    }

    pub fn get(&self, id: OrderId, price: Price) -> Option<&Order> {
        self.levels.get(&K::from_price(price))?.get(id)
    }

    pub fn push(&mut self, order: Order) -> bool {
        let side = self.side;
        let level = self
            .levels
            .entry(K::from_price(order.price))
            .or_insert_with(|| PriceLevel::new(side, order.price));

        let added = level.push_back(order);
        if added {
            self.orders += 1;
        }
        added
    }

    pub fn remove(&mut self, id: OrderId, price: Price) -> Option<Order> {
        let key = K::from_price(price);
        let level = self.levels.get_mut(&key)?;
        let removed = level.remove(id)?;

        if level.is_empty() {
            self.levels.remove(&key);
        }
        self.orders -= 1;

        Some(removed)
    }

    pub fn amend(&mut self, id: OrderId, price: Price, size: Size) -> Option<Order> {
        self.levels.get_mut(&K::from_price(price))?.amend(id, size)
    }

    pub fn levels(&self) -> btree_map::Values<'_, K, PriceLevel> {
        self.levels.values()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
        self.orders = 0;
    }
}
