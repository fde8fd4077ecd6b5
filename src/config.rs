use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// What `add_order` does when the id is already resting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with `BookError::DuplicateOrder`, book unchanged.
    #[default]
    Reject,
    /// Cancel the resting order and queue the new one at the back of its level.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub symbol: String,
    pub duplicate_policy: DuplicatePolicy,
    /// Bound of the request channel feeding the async book.
    pub channel_capacity: usize,
    /// Distinct price levels per side carried in published snapshots.
    pub snapshot_depth: usize,
    /// Publish snapshots at most this often; `None` disables publishing.
    pub publish_interval_ms: Option<u64>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            duplicate_policy: DuplicatePolicy::Reject,
            channel_capacity: 1024,
            snapshot_depth: 10,
            publish_interval_ms: None,
        }
    }
}

impl BookConfig {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: BookConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be greater than 0"));
        }
        if self.publish_interval_ms == Some(0) {
            return Err(ConfigError::Invalid("publish_interval_ms must be greater than 0"));
        }
        Ok(())
    }

    pub fn publish_interval(&self) -> Option<Duration> {
        self.publish_interval_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed book config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid book config: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = BookConfig::from_json(r#"{"symbol":"BTCUSDT"}"#).unwrap();

        assert_eq!(config.symbol, "BTCUSDT");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.channel_capacity, 1024);
        assert_eq!(config.publish_interval(), None);
    }

    #[test]
    fn parses_policy_and_interval() {
        let raw = r#"{"symbol":"ETH","duplicate_policy":"replace","publish_interval_ms":250}"#;
        let config = BookConfig::from_json(raw).unwrap();

        assert_eq!(config.duplicate_policy, DuplicatePolicy::Replace);
        assert_eq!(config.publish_interval(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn rejects_bad_config() {
        assert!(matches!(
            BookConfig::from_json(r#"{"channel_capacity":0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(BookConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }
}
