//! Bridge configuration with validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Queue names on the bus.
    pub queues: QueueConfig,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Scheduled refresh of every catalogued project.
    pub auto_refresh: AutoRefreshConfig,
    /// Result cache retention.
    pub result_cache: ResultCacheConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            queues: QueueConfig::default(),
            timeouts: TimeoutConfig::default(),
            auto_refresh: AutoRefreshConfig::default(),
            result_cache: ResultCacheConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queues.work.trim().is_empty() || self.queues.result.trim().is_empty() {
            return Err(ConfigError::InvalidQueue(
                "queue names cannot be empty".into(),
            ));
        }

        if self.queues.work == self.queues.result {
            return Err(ConfigError::InvalidQueue(
                "work and result queues must differ".into(),
            ));
        }

        if self.timeouts.process.as_millis() == 0 {
            return Err(ConfigError::InvalidTimeout(
                "process timeout cannot be 0".into(),
            ));
        }

        if self.timeouts.pending_sweep.as_millis() == 0 {
            return Err(ConfigError::InvalidTimeout(
                "pending sweep interval cannot be 0".into(),
            ));
        }

        if self.auto_refresh.enabled && self.auto_refresh.interval.as_millis() == 0 {
            return Err(ConfigError::InvalidTimeout(
                "auto-refresh interval cannot be 0".into(),
            ));
        }

        Ok(())
    }
}

/// Queue names, matching what the worker consumes and produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Outbound work queue.
    pub work: String,
    /// Inbound result queue.
    pub result: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            work: "sheet.process".to_string(),
            result: "sheet.process.result".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bound on synchronous process calls.
    #[serde(with = "humantime_serde")]
    pub process: Duration,
    /// Interval of the abandoned-waiter sweep.
    #[serde(with = "humantime_serde")]
    pub pending_sweep: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            process: Duration::from_secs(30),
            pending_sweep: Duration::from_secs(60),
        }
    }
}

/// Scheduled refresh configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoRefreshConfig {
    /// Enable the periodic refresh task.
    pub enabled: bool,
    /// Delay between refresh rounds.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for AutoRefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Result cache retention configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultCacheConfig {
    /// Time-to-live for cached outcomes. `None` retains them for the
    /// process lifetime.
    #[serde(with = "humantime_serde::option")]
    pub ttl: Option<Duration>,
    /// Interval of the eviction sweep (only spawned when a TTL is set).
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            ttl: None,
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid queue naming.
    #[error("invalid queue: {0}")]
    InvalidQueue(String),
    /// Invalid timeout or interval value.
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Humantime serde module for Duration serialization.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn format(duration: &Duration) -> String {
        if duration.subsec_millis() > 0 {
            format!("{}ms", duration.as_millis())
        } else {
            format!("{}s", duration.as_secs())
        }
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(hours) = s.strip_suffix('h') {
            hours
                .trim()
                .parse::<u64>()
                .map(|h| Duration::from_secs(h * 3600))
                .map_err(|_| "invalid hours")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else {
            // Try parsing as plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }

    /// Same format for `Option<Duration>`; absent or `null` means no value.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => serializer.serialize_some(&super::format(d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s: Option<String> = Option::deserialize(deserializer)?;
            s.map(|s| super::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
