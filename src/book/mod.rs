mod core;
mod half;
mod level;
mod queue;
mod shared;

pub use self::core::Book;
pub use half::{HalfBook, LevelKey};
pub use level::PriceLevel;
pub use queue::{Iter, Queue};
pub use shared::OrderBook;

use crate::types::Price;
use std::cmp::Reverse;
use std::collections::btree_map;

/// Price levels of one side, best first.
pub enum Levels<'a> {
    Bids(btree_map::Values<'a, Reverse<Price>, PriceLevel>),
    Offers(btree_map::Values<'a, Price, PriceLevel>),
}

impl<'a> Iterator for Levels<'a> {
    type Item = &'a PriceLevel;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Levels::Bids(it) => it.next(),
            Levels::Offers(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Levels::Bids(it) => it.size_hint(),
            Levels::Offers(it) => it.size_hint(),
        }
    }
}
