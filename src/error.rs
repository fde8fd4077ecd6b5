use crate::types::{OrderId, Side};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error("unknown side {0:?}")]
    InvalidSide(String),
    #[error("level must be a positive depth, got {0}")]
    InvalidLevel(i64),
    #[error("invalid price {0}")]
    InvalidPrice(String),
    #[error("invalid size {0}")]
    InvalidSize(u64),
    #[error("order {0} not found")]
    NotFound(OrderId),
    #[error("order {0} already resting in the book")]
    DuplicateOrder(OrderId),
    #[error("no resting orders on the {0} side")]
    Empty(Side),
    #[error("depth {depth} exceeds the {resident} resting orders on the {side} side")]
    OutOfRange { side: Side, depth: usize, resident: usize },
    #[error("book processor has shut down")]
    Closed,
}

impl BookError {
    /// True when a depth query found nothing at the requested position.
    pub fn is_absent(&self) -> bool {
        matches!(self, BookError::Empty(_) | BookError::OutOfRange { .. })
    }
}
