//! Navigation wait.
//!
//! Polls the host's current location until it matches a target, then holds a
//! short settle delay so the UI can render the new page. The wait is bounded by
//! a timeout and can be cancelled at any point.

use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tour_core::config::NavigationConfig;
use tour_core::ports::NavigationPort;
use tour_core::{Location, NavigationOutcome};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationWait {
    poll_interval: Duration,
    settle_delay: Duration,
    timeout: Duration,
}

impl NavigationWait {
    pub fn new(poll_interval: Duration, settle_delay: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            settle_delay,
            timeout,
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.poll_interval, config.settle_delay, config.timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn wait_for(
        &self,
        navigation: &dyn NavigationPort,
        target: &Location,
        cancel: &CancellationToken,
    ) -> NavigationOutcome {
        let reached = timeout(self.timeout, self.poll_until(navigation, target));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return NavigationOutcome::Cancelled,
            result = reached => {
                if result.is_err() {
                    return NavigationOutcome::TimedOut;
                }
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => NavigationOutcome::Cancelled,
            _ = sleep(self.settle_delay) => NavigationOutcome::Reached,
        }
    }

    async fn poll_until(&self, navigation: &dyn NavigationPort, target: &Location) {
        while navigation.current_location() != *target {
            sleep(self.poll_interval).await;
        }
    }
}

impl Default for NavigationWait {
    fn default() -> Self {
        Self::from_config(&NavigationConfig::default())
    }
}
