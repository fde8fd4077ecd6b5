use crate::error::BookError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prices are held as fixed-point integers so both side maps are keyed by a total order.
pub const PRICE_SCALE: f64 = 100_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(val: u64) -> Self {
        Self(val)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(pub u64);

impl Price {
    pub fn as_f64(&self) -> f64 {
        (*self).into()
    }
}

impl TryFrom<f64> for Price {
    type Error = BookError;

    fn try_from(val: f64) -> Result<Self, Self::Error> {
        let n = (val * PRICE_SCALE).round();
        if !n.is_finite() || n < 0.0 || n >= u64::MAX as f64 {
            return Err(BookError::InvalidPrice(val.to_string()));
        }
        Ok(Self(n as u64))
    }
}

impl From<Price> for f64 {
    fn from(val: Price) -> Self {
        val.0 as f64 / PRICE_SCALE
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

impl Serialize for Price {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        f64_price::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64_price::deserialize(deserializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub u64);

impl Size {
    pub fn val(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const ZERO_SIZE: Size = Size(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Offer,
}

impl Side {
    /// Single-character code used by the legacy call shape.
    pub fn code(&self) -> char {
        match self {
            Side::Bid => 'B',
            Side::Offer => 'O',
        }
    }
}

impl TryFrom<char> for Side {
    type Error = BookError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'B' => Ok(Side::Bid),
            'O' => Ok(Side::Offer),
            other => Err(BookError::InvalidSide(other.to_string())),
        }
    }
}

impl FromStr for Side {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "bid" | "buy" => Ok(Side::Bid),
            "o" | "offer" | "ask" | "sell" => Ok(Side::Offer),
            _ => Err(BookError::InvalidSide(s.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Offer => write!(f, "offer"),
        }
    }
}

/// A resting order. Immutable: a size change yields a new value with the same id, price and side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub price: Price,
    pub side: Side,
    pub size: Size,
}

impl Order {
    pub fn new(id: u64, price: f64, side: Side, size: u64) -> Result<Self, BookError> {
        if size == 0 {
            return Err(BookError::InvalidSize(size));
        }

        Ok(Self::from_parts(OrderId(id), Price::try_from(price)?, side, Size(size)))
    }

    pub fn from_parts(id: OrderId, price: Price, side: Side, size: Size) -> Self {
        Self { id, price, side, size }
    }

    pub fn bid(id: u64, price: f64, size: u64) -> Result<Self, BookError> {
        Self::new(id, price, Side::Bid, size)
    }

    pub fn offer(id: u64, price: f64, size: u64) -> Result<Self, BookError> {
        Self::new(id, price, Side::Offer, size)
    }

    pub fn with_size(&self, size: Size) -> Self {
        Self { size, ..*self }
    }
}

/// Serializer and Deserializer rendering a fixed-point [Price] as a float.
/// Accepts both JSON numbers and numeric strings on the way in.
pub mod f64_price {
    use super::Price;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(value: &Price, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Price, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumOrStr {
            Str(String),
            Float(f64),
        }

        let f = match NumOrStr::deserialize(deserializer)? {
            NumOrStr::Str(s) => s.parse::<f64>().map_err(<D::Error as de::Error>::custom)?,
            NumOrStr::Float(f) => f,
        };

        Price::try_from(f).map_err(<D::Error as de::Error>::custom)
    }
}
