//! Runtime configuration.

use std::time::Duration;

/// Configuration for the supervisor and refresh loop.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Time between reconciliation passes.
    pub refresh_interval: Duration,
    /// Upper bound on one session handshake.
    pub start_timeout: Duration,
    /// Upper bound on closing one session.
    pub shutdown_timeout: Duration,
    /// Consecutive failed starts after which a bot is reported as failing.
    pub failure_alert_threshold: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            start_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(5),
            failure_alert_threshold: 5,
        }
    }
}

impl RuntimeConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Sets the handshake timeout.
    pub fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    /// Sets the per-session close timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the failure alert threshold.
    pub fn with_failure_alert_threshold(mut self, threshold: u32) -> Self {
        self.failure_alert_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();

        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.start_timeout, Duration::from_secs(30));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.failure_alert_threshold, 5);
    }

    #[test]
    fn test_config_builder() {
        let config = RuntimeConfig::new()
            .with_refresh_interval(Duration::from_secs(10))
            .with_start_timeout(Duration::from_secs(3))
            .with_shutdown_timeout(Duration::from_millis(500))
            .with_failure_alert_threshold(2);

        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert_eq!(config.start_timeout, Duration::from_secs(3));
        assert_eq!(config.shutdown_timeout, Duration::from_millis(500));
        assert_eq!(config.failure_alert_threshold, 2);
    }
}
