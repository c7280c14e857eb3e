use std::time::Duration;

use super::{LoggingConfig, NavigationConfig, PersistenceConfig, TourConfig};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_STORAGE_KEY: &str = "tour-progress";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 8_000;

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: None,
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_dir: None }
    }
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            persistence: PersistenceConfig::default(),
            navigation: NavigationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
