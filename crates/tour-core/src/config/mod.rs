//! Tour engine configuration DTOs.
//!
//! Pure data: the host reads a TOML file and maps it here. Absent keys fall back
//! to the values in [`defaults`]; present keys are taken as-is, except that
//! durations must be non-negative integers.

pub mod defaults;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourConfig {
    pub persistence: PersistenceConfig,
    pub navigation: NavigationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Quiet period before coalesced writes are flushed.
    pub debounce: Duration,
    /// Key under which the progress record is stored.
    pub storage_key: String,
    /// Directory of the file store; `None` lets the host pick a platform directory.
    pub storage_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationConfig {
    pub poll_interval: Duration,
    /// Extra hold after the target location is reached, for the UI to settle.
    pub settle_delay: Duration,
    /// Upper bound on a single navigation wait.
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
}

impl TourConfig {
    /// Create TourConfig from a TOML value.
    ///
    /// ```toml
    /// [persistence]
    /// debounce_ms = 300
    /// storage_key = "tour-progress"
    /// storage_dir = "/var/lib/app"
    ///
    /// [navigation]
    /// poll_interval_ms = 50
    /// settle_delay_ms = 100
    /// timeout_ms = 8000
    ///
    /// [logging]
    /// log_dir = "/var/log/app"
    /// ```
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = read_millis(toml_value, "persistence", "debounce_ms")? {
            config.persistence.debounce = ms;
        }
        if let Some(key) = read_str(toml_value, "persistence", "storage_key") {
            config.persistence.storage_key = key.to_string();
        }
        config.persistence.storage_dir =
            read_str(toml_value, "persistence", "storage_dir").map(PathBuf::from);

        if let Some(ms) = read_millis(toml_value, "navigation", "poll_interval_ms")? {
            config.navigation.poll_interval = ms;
        }
        if let Some(ms) = read_millis(toml_value, "navigation", "settle_delay_ms")? {
            config.navigation.settle_delay = ms;
        }
        if let Some(ms) = read_millis(toml_value, "navigation", "timeout_ms")? {
            config.navigation.timeout = ms;
        }

        config.logging.log_dir = read_str(toml_value, "logging", "log_dir").map(PathBuf::from);

        Ok(config)
    }
}

fn read_str<'a>(toml_value: &'a toml::Value, section: &str, key: &str) -> Option<&'a str> {
    toml_value
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_str())
}

fn read_millis(
    toml_value: &toml::Value,
    section: &str,
    key: &str,
) -> anyhow::Result<Option<Duration>> {
    let Some(value) = toml_value.get(section).and_then(|s| s.get(key)) else {
        return Ok(None);
    };
    let ms = value
        .as_integer()
        .ok_or_else(|| anyhow!("[{section}] {key} must be an integer"))?;
    if ms < 0 {
        bail!("[{section}] {key} must not be negative, got {ms}");
    }
    Ok(Some(Duration::from_millis(ms as u64)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> anyhow::Result<TourConfig> {
        let value: toml::Value = toml::from_str(content)?;
        TourConfig::from_toml(&value)
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, TourConfig::default());
        assert_eq!(config.persistence.debounce, Duration::from_millis(300));
        assert_eq!(config.navigation.poll_interval, Duration::from_millis(50));
        assert_eq!(config.persistence.storage_key, "tour-progress");
    }

    #[test]
    fn reads_all_sections() {
        let config = parse(
            r#"
            [persistence]
            debounce_ms = 500
            storage_key = "tours"
            storage_dir = "/tmp/tours"

            [navigation]
            poll_interval_ms = 20
            settle_delay_ms = 0
            timeout_ms = 5000

            [logging]
            log_dir = "/tmp/logs"
            "#,
        )
        .unwrap();

        assert_eq!(config.persistence.debounce, Duration::from_millis(500));
        assert_eq!(config.persistence.storage_key, "tours");
        assert_eq!(
            config.persistence.storage_dir,
            Some(PathBuf::from("/tmp/tours"))
        );
        assert_eq!(config.navigation.poll_interval, Duration::from_millis(20));
        assert_eq!(config.navigation.settle_delay, Duration::ZERO);
        assert_eq!(config.navigation.timeout, Duration::from_secs(5));
        assert_eq!(config.logging.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let err = parse("[navigation]\ntimeout_ms = -1").unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn non_integer_duration_is_rejected() {
        assert!(parse("[persistence]\ndebounce_ms = \"fast\"").is_err());
    }
}
