use crate::book::PriceLevel;
use crate::types::{Price, Size};
use serde::{Deserialize, Serialize};

/// Aggregate of one distinct price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub price: Price,
    pub size: Size,
    pub orders: usize,
}

impl From<&PriceLevel> for LevelSummary {
    fn from(level: &PriceLevel) -> Self {
        Self {
            price: level.price(),
            size: level.total_size(),
            orders: level.len(),
        }
    }
}

/// Price-aggregated view of the top of the book, best level first on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    /// Count of mutations applied to the book when the snapshot was taken.
    pub sequence: u64,
    pub bids: Vec<LevelSummary>,
    pub offers: Vec<LevelSummary>,
}

impl BookSnapshot {
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_offer(&self) -> Option<Price> {
        self.offers.first().map(|l| l.price)
    }

    pub fn mid(&self) -> Option<Price> {
        let (bid, offer) = (self.best_bid()?, self.best_offer()?);
        Some(Price(bid.0 / 2 + offer.0 / 2 + (bid.0 % 2 + offer.0 % 2) / 2))
    }

    /// Offer minus bid; `None` when either side is empty or the book is crossed.
    pub fn spread(&self) -> Option<Price> {
        let (bid, offer) = (self.best_bid()?, self.best_offer()?);
        offer.0.checked_sub(bid.0).map(Price)
    }
}
