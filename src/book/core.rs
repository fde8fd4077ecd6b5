use super::half::HalfBook;
use super::{Levels, PriceLevel};
use crate::config::{BookConfig, DuplicatePolicy};
use crate::error::BookError;
use crate::event::OrderEvent;
use crate::snapshot::{BookSnapshot, LevelSummary};
use crate::types::{Order, OrderId, Price, Side, Size, ZERO_SIZE};
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Order-by-order limit order book for a single instrument.
///
/// `Book` is the single-owner core: mutation takes `&mut self`, so exclusive
/// access is enforced by the borrow checker. Share it across threads through
/// [`OrderBook`](crate::OrderBook) or across tasks through
/// [`AsyncBook`](crate::AsyncBook).
///
/// The id index stores only where an order rests; the order value itself
/// lives once, in its level's queue.
pub struct Book {
    symbol: String,
    duplicate_policy: DuplicatePolicy,
    index: HashMap<OrderId, (Side, Price)>,
    bids: HalfBook<Reverse<Price>>,
    offers: HalfBook<Price>,
    sequence: u64,
}

impl Book {
    pub fn new() -> Self {
        Self::with_config(&BookConfig::default())
    }

    pub fn with_config(config: &BookConfig) -> Self {
        Self {
            symbol: config.symbol.clone(),
            duplicate_policy: config.duplicate_policy,
            index: HashMap::new(),
            bids: HalfBook::new(Side::Bid),
            offers: HalfBook::new(Side::Offer),
            sequence: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of mutations applied so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get_order(&self, id: OrderId) -> Option<Order> {
        let &(side, price) = self.index.get(&id)?;
        match side {
            Side::Bid => self.bids.get(id, price).copied(),
            Side::Offer => self.offers.get(id, price).copied(),
        }
    }

    /// Queues `order` at the back of its (side, price) level, creating the level if needed.
    pub fn add_order(&mut self, order: Order) -> Result<(), BookError> {
        if order.size == ZERO_SIZE {
            return Err(BookError::InvalidSize(order.size.val()));
        }

        if self.index.contains_key(&order.id) {
            match self.duplicate_policy {
                DuplicatePolicy::Reject => {
                    warn!(symbol = %self.symbol, id = %order.id, "rejected duplicate order id");
                    return Err(BookError::DuplicateOrder(order.id));
                }
                DuplicatePolicy::Replace => {
                    debug!(symbol = %self.symbol, id = %order.id, "replacing resting order");
                    self.take(order.id);
                }
            }
        }

        let queued = match order.side {
            Side::Bid => self.bids.push(order),
            Side::Offer => self.offers.push(order),
        };
        debug_assert!(queued, "index and levels out of sync for {}", order.id);

        self.index.insert(order.id, (order.side, order.price));
        self.sequence += 1;

        debug!(
            symbol = %self.symbol,
            id = %order.id,
            side = %order.side,
            price = %order.price,
            size = %order.size,
            "order added"
        );
        Ok(())
    }

    /// Cancels the order. An unknown id is a no-op and returns `None`.
    pub fn remove_order(&mut self, id: OrderId) -> Option<Order> {
        let removed = self.take(id)?;
        self.sequence += 1;

        debug!(symbol = %self.symbol, id = %id, side = %removed.side, price = %removed.price, "order removed");
        Some(removed)
    }

    /// Replaces the size of a resting order without touching its queue position.
    /// A size of zero or below cancels it exactly like [`Book::remove_order`].
    pub fn modify_order_size(&mut self, id: OrderId, size: i64) -> Result<Option<Order>, BookError> {
        if size <= 0 {
            self.remove_order(id);
            return Ok(None);
        }

        let Some(&(side, price)) = self.index.get(&id) else {
            warn!(symbol = %self.symbol, id = %id, "modify for unknown order");
            return Err(BookError::NotFound(id));
        };

        let new_size = Size(size as u64);
        let amended = match side {
            Side::Bid => self.bids.amend(id, price, new_size),
            Side::Offer => self.offers.amend(id, price, new_size),
        }
        .ok_or(BookError::NotFound(id))?;
        self.sequence += 1;

        debug!(symbol = %self.symbol, id = %id, size = %new_size, "order size modified");
        Ok(Some(amended))
    }

    pub fn apply(&mut self, event: OrderEvent) -> Result<(), BookError> {
        match event {
            OrderEvent::Add(order) => self.add_order(order),
            OrderEvent::Remove { id } => {
                self.remove_order(id);
                Ok(())
            }
            OrderEvent::Modify { id, size } => self.modify_order_size(id, size).map(|_| ()),
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.bids.clear();
        self.offers.clear();
        self.sequence += 1;
        debug!(symbol = %self.symbol, "book cleared");
    }

    pub fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Bid => self.bids.best_price(),
            Side::Offer => self.offers.best_price(),
        }
    }

    /// Price at 1-indexed `level`. Level 1 is the best price on that side;
    /// deeper levels are resolved by [`Book::price_at_order_depth`].
    pub fn price_for_level(&self, side: Side, level: usize) -> Result<Price, BookError> {
        match level {
            0 => Err(BookError::InvalidLevel(0)),
            1 => self.best_price(side).ok_or(BookError::Empty(side)),
            depth => self.price_at_order_depth(side, depth),
        }
    }

    /// Price of the `depth`-th resting order in price-time priority.
    ///
    /// Depth counts orders, not distinct prices: two orders at the same price
    /// take two consecutive depth slots. See [`Book::snapshot`] for the
    /// per-price view.
    pub fn price_at_order_depth(&self, side: Side, depth: usize) -> Result<Price, BookError> {
        self.order_at_depth(side, depth).map(|o| o.price)
    }

    /// Size of the order at 1-indexed `level`, counting orders like
    /// [`Book::price_at_order_depth`].
    pub fn total_size_for_level(&self, side: Side, level: usize) -> Result<Size, BookError> {
        self.size_at_order_depth(side, level)
    }

    pub fn size_at_order_depth(&self, side: Side, depth: usize) -> Result<Size, BookError> {
        self.order_at_depth(side, depth).map(|o| o.size)
    }

    fn order_at_depth(&self, side: Side, depth: usize) -> Result<&Order, BookError> {
        if depth == 0 {
            return Err(BookError::InvalidLevel(0));
        }

        let resident = self.side_len(side);
        if resident == 0 {
            return Err(BookError::Empty(side));
        }

        trace!(symbol = %self.symbol, side = %side, depth, resident, "order depth lookup");
        self.iter_side(side)
            .nth(depth - 1)
            .ok_or(BookError::OutOfRange { side, depth, resident })
    }

    /// Resting orders on `side`, best price first and arrival order within a price.
    pub fn orders(&self, side: Side) -> Vec<Order> {
        self.iter_side(side).copied().collect()
    }

    pub fn iter_side(&self, side: Side) -> impl Iterator<Item = &Order> + '_ {
        self.levels(side).flat_map(PriceLevel::iter)
    }

    pub fn levels(&self, side: Side) -> Levels<'_> {
        match side {
            Side::Bid => Levels::Bids(self.bids.levels()),
            Side::Offer => Levels::Offers(self.offers.levels()),
        }
    }

    pub fn side_len(&self, side: Side) -> usize {
        match side {
            Side::Bid => self.bids.len(),
            Side::Offer => self.offers.len(),
        }
    }

    pub fn level_count(&self, side: Side) -> usize {
        match side {
            Side::Bid => self.bids.level_count(),
            Side::Offer => self.offers.level_count(),
        }
    }

    /// Top `depth` distinct price levels per side, aggregated.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            symbol: self.symbol.clone(),
            sequence: self.sequence,
            bids: self.levels(Side::Bid).take(depth).map(LevelSummary::from).collect(),
            offers: self.levels(Side::Offer).take(depth).map(LevelSummary::from).collect(),
        }
    }

    fn take(&mut self, id: OrderId) -> Option<Order> {
        let (side, price) = self.index.remove(&id)?;
        let removed = match side {
            Side::Bid => self.bids.remove(id, price),
            Side::Offer => self.offers.remove(id, price),
        };
        debug_assert!(removed.is_some(), "index and levels out of sync for {}", id);
        removed
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn px(p: f64) -> Price {
        Price::try_from(p).unwrap()
    }

    fn bids_book() -> Book {
        let mut book = Book::new();
        book.add_order(Order::bid(1, 100.40, 200).unwrap()).unwrap();
        book.add_order(Order::bid(2, 101.40, 100).unwrap()).unwrap();
        book.add_order(Order::bid(3, 200.40, 50).unwrap()).unwrap();
        book.add_order(Order::bid(4, 100.40, 600).unwrap()).unwrap();
        book
    }

    fn ids(book: &Book, side: Side) -> Vec<u64> {
        book.iter_side(side).map(|o| o.id.0).collect()
    }

    #[test]
    fn flattened_price_time_order() {
        let book = bids_book();

        assert_eq!(ids(&book, Side::Bid), vec![3, 2, 1, 4]);
        assert_eq!(book.price_for_level(Side::Bid, 1), Ok(px(200.40)));
        assert_eq!(book.price_for_level(Side::Bid, 3), Ok(px(100.40)));
        assert_eq!(book.price_for_level(Side::Bid, 4), Ok(px(100.40)));
        assert_eq!(book.total_size_for_level(Side::Bid, 3), Ok(Size(200)));
        assert_eq!(book.total_size_for_level(Side::Bid, 4), Ok(Size(600)));
    }

    #[test]
    fn depth_errors_are_distinguishable() {
        let book = bids_book();

        assert_eq!(book.price_for_level(Side::Bid, 0), Err(BookError::InvalidLevel(0)));
        assert_eq!(book.total_size_for_level(Side::Bid, 0), Err(BookError::InvalidLevel(0)));
        assert_eq!(
            book.price_for_level(Side::Bid, 5),
            Err(BookError::OutOfRange { side: Side::Bid, depth: 5, resident: 4 })
        );
        assert_eq!(book.price_for_level(Side::Offer, 1), Err(BookError::Empty(Side::Offer)));
        assert_eq!(book.total_size_for_level(Side::Offer, 2), Err(BookError::Empty(Side::Offer)));
    }

    #[test]
    fn remove_prunes_and_is_idempotent() {
        let mut book = bids_book();

        assert_eq!(book.remove_order(OrderId(3)).map(|o| o.size), Some(Size(50)));
        assert_eq!(book.level_count(Side::Bid), 2);
        let seq = book.sequence();

        assert_eq!(book.remove_order(OrderId(3)), None);
        assert_eq!(book.sequence(), seq);
        assert_eq!(book.best_price(Side::Bid), Some(px(101.40)));
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn modify_keeps_queue_slot() {
        let mut book = bids_book();

        let amended = book.modify_order_size(OrderId(1), 10_000).unwrap().unwrap();
        assert_eq!(amended.size, Size(10_000));
        assert_eq!(ids(&book, Side::Bid), vec![3, 2, 1, 4]);
        assert_eq!(book.total_size_for_level(Side::Bid, 3), Ok(Size(10_000)));
        assert_eq!(book.get_order(OrderId(1)), Some(amended));
    }

    #[test]
    fn modify_to_zero_cancels() {
        let mut book = bids_book();

        assert_eq!(book.modify_order_size(OrderId(2), 0), Ok(None));
        assert_eq!(book.modify_order_size(OrderId(2), -5), Ok(None));
        assert!(!book.contains(OrderId(2)));
        assert_eq!(ids(&book, Side::Bid), vec![3, 1, 4]);
    }

    #[test]
    fn modify_unknown_is_not_found() {
        let mut book = bids_book();
        assert_eq!(book.modify_order_size(OrderId(99), 5), Err(BookError::NotFound(OrderId(99))));
    }

    #[test]
    fn duplicate_rejected_by_default() {
        let mut book = bids_book();

        let dup = Order::offer(1, 1.0, 1).unwrap();
        assert_eq!(book.add_order(dup), Err(BookError::DuplicateOrder(OrderId(1))));
        assert_eq!(book.side_len(Side::Offer), 0);
        assert_eq!(book.get_order(OrderId(1)).map(|o| o.size), Some(Size(200)));
    }

    #[test]
    fn duplicate_replace_policy_requeues() {
        let config = BookConfig {
            duplicate_policy: DuplicatePolicy::Replace,
            ..BookConfig::default()
        };
        let mut book = Book::with_config(&config);
        book.add_order(Order::bid(1, 100.40, 200).unwrap()).unwrap();
        book.add_order(Order::bid(4, 100.40, 600).unwrap()).unwrap();

        book.add_order(Order::bid(1, 100.40, 300).unwrap()).unwrap();
        assert_eq!(ids(&book, Side::Bid), vec![4, 1]);
        assert_eq!(book.len(), 2);

        book.add_order(Order::offer(4, 105.0, 1).unwrap()).unwrap();
        assert_eq!(ids(&book, Side::Bid), vec![1]);
        assert_eq!(ids(&book, Side::Offer), vec![4]);
    }

    #[test]
    fn rejects_zero_size_add() {
        let mut book = Book::new();
        let order = Order::from_parts(OrderId(1), px(1.0), Side::Bid, ZERO_SIZE);

        assert_eq!(book.add_order(order), Err(BookError::InvalidSize(0)));
        assert!(book.is_empty());
    }

    #[test]
    fn snapshot_aggregates_levels() {
        let mut book = bids_book();
        book.add_order(Order::offer(10, 201.0, 7).unwrap()).unwrap();

        let snap = book.snapshot(2);
        assert_eq!(snap.bids.len(), 2);
        assert_eq!(snap.bids[0].price, px(200.40));

        let snap = book.snapshot(10);
        let deepest = snap.bids[2];
        assert_eq!(deepest.price, px(100.40));
        assert_eq!(deepest.size, Size(800));
        assert_eq!(deepest.orders, 2);
        assert_eq!(snap.best_offer(), Some(px(201.0)));
        assert_eq!(snap.sequence, 5);
    }

    #[test]
    fn apply_events() {
        let mut book = Book::new();

        book.apply(Order::offer(1, 10.0, 5).unwrap().into()).unwrap();
        book.apply(OrderEvent::Modify { id: OrderId(1), size: 8 }).unwrap();
        assert_eq!(book.total_size_for_level(Side::Offer, 1), Ok(Size(8)));

        book.apply(OrderEvent::Remove { id: OrderId(1) }).unwrap();
        book.apply(OrderEvent::Remove { id: OrderId(1) }).unwrap();
        assert!(book.is_empty());

        assert_eq!(
            book.apply(OrderEvent::Modify { id: OrderId(1), size: 8 }),
            Err(BookError::NotFound(OrderId(1)))
        );
    }

    #[test]
    fn clear_drops_everything() {
        let mut book = bids_book();
        book.clear();

        assert!(book.is_empty());
        assert_eq!(book.level_count(Side::Bid), 0);
        assert!(book.orders(Side::Bid).is_empty());
    }
}
