use super::Book;
use crate::config::BookConfig;
use crate::error::BookError;
use crate::event::OrderEvent;
use crate::snapshot::BookSnapshot;
use crate::types::{Order, OrderId, Price, Side, Size};
use parking_lot::Mutex;

/// Thread-safe order book.
///
/// One mutex guards the id index and both sides together, and every public
/// method (reads included) runs entirely under it, so each call is atomic with
/// respect to every other. Share with `Arc<OrderBook>`.
#[derive(Default)]
pub struct OrderBook {
    inner: Mutex<Book>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &BookConfig) -> Self {
        Self {
            inner: Mutex::new(Book::with_config(config)),
        }
    }

    /// Runs `f` against the book under the lock, for compound reads that must
    /// observe a single state.
    pub fn read<R>(&self, f: impl FnOnce(&Book) -> R) -> R {
        let book = self.inner.lock();
        f(&book)
    }

    pub fn add_order(&self, order: Order) -> Result<(), BookError> {
        self.inner.lock().add_order(order)
    }

    pub fn remove_order(&self, id: OrderId) -> Option<Order> {
        self.inner.lock().remove_order(id)
    }

    pub fn modify_order_size(&self, id: OrderId, size: i64) -> Result<Option<Order>, BookError> {
        self.inner.lock().modify_order_size(id, size)
    }

    pub fn apply(&self, event: OrderEvent) -> Result<(), BookError> {
        self.inner.lock().apply(event)
    }

    /// Applies `events` in order under one lock acquisition, stopping at the
    /// first failure. Events before the failing one stay applied.
    pub fn apply_batch<I>(&self, events: I) -> Result<(), BookError>
    where
        I: IntoIterator<Item = OrderEvent>,
    {
        let mut book = self.inner.lock();
        events.into_iter().try_for_each(|event| book.apply(event))
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    pub fn get_order(&self, id: OrderId) -> Option<Order> {
        self.inner.lock().get_order(id)
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.inner.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn side_len(&self, side: Side) -> usize {
        self.inner.lock().side_len(side)
    }

    pub fn level_count(&self, side: Side) -> usize {
        self.inner.lock().level_count(side)
    }

    pub fn best_price(&self, side: Side) -> Option<Price> {
        self.inner.lock().best_price(side)
    }

    pub fn price_for_level(&self, side: Side, level: usize) -> Result<Price, BookError> {
        self.inner.lock().price_for_level(side, level)
    }

    pub fn price_at_order_depth(&self, side: Side, depth: usize) -> Result<Price, BookError> {
        self.inner.lock().price_at_order_depth(side, depth)
    }

    pub fn total_size_for_level(&self, side: Side, level: usize) -> Result<Size, BookError> {
        self.inner.lock().total_size_for_level(side, level)
    }

    pub fn size_at_order_depth(&self, side: Side, depth: usize) -> Result<Size, BookError> {
        self.inner.lock().size_at_order_depth(side, depth)
    }

    pub fn orders(&self, side: Side) -> Vec<Order> {
        self.inner.lock().orders(side)
    }

    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        self.inner.lock().snapshot(depth)
    }

    /// Legacy call shape: char side, signed level, and `0.0` for a depth past
    /// the last resting order. An empty side still fails on level 1.
    pub fn legacy_price_for_level(&self, side: char, level: i32) -> Result<f64, BookError> {
        let (side, level) = legacy_args(side, level)?;
        match self.price_for_level(side, level) {
            Ok(price) => Ok(price.as_f64()),
            Err(BookError::Empty(_)) if level > 1 => Ok(0.0),
            Err(BookError::OutOfRange { .. }) => Ok(0.0),
            Err(e) => Err(e),
        }
    }

    /// Legacy call shape for sizes; `0` for a depth past the last resting order.
    pub fn legacy_total_size_for_level(&self, side: char, level: i32) -> Result<u64, BookError> {
        let (side, level) = legacy_args(side, level)?;
        match self.total_size_for_level(side, level) {
            Ok(size) => Ok(size.val()),
            Err(e) if e.is_absent() => Ok(0),
            Err(e) => Err(e),
        }
    }
}

fn legacy_args(side: char, level: i32) -> Result<(Side, usize), BookError> {
    let side = Side::try_from(side)?;
    if level <= 0 {
        return Err(BookError::InvalidLevel(level as i64));
    }
    Ok((side, level as usize))
}
