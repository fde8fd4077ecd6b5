//! In-memory, order-by-order limit order book for a single instrument.
//!
//! [`Book`] is the single-owner core. [`OrderBook`] wraps it in one mutex for
//! shared use across threads, and [`AsyncBook`] runs it inside a tokio task
//! reached through cloneable [`BookHandle`]s.

pub mod actor;
pub mod book;
pub mod config;
pub mod error;
pub mod event;
pub mod snapshot;
pub mod types;

pub use actor::{AsyncBook, BookHandle};
pub use book::{Book, OrderBook};
pub use config::{BookConfig, ConfigError, DuplicatePolicy};
pub use error::BookError;
pub use event::OrderEvent;
pub use snapshot::{BookSnapshot, LevelSummary};
pub use types::{Order, OrderId, Price, Side, Size};
