//! Configuration types for the kef-stream crate
//!
//! [`StreamConfig`] controls the long-poll cadence, the retry policy for
//! failed cycles and the size of the event channel.

use std::time::Duration;

use crate::error::StreamError;

/// Configuration for a [`KefStream`](crate::KefStream)
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// How long the speaker may hold a poll request open before answering
    /// with an empty batch. Sent as whole seconds, at least one.
    /// Default: 10 seconds
    pub poll_timeout: Duration,

    /// Extra time granted on top of `poll_timeout` before a poll request is
    /// abandoned as failed
    /// Default: 5 seconds
    pub request_grace: Duration,

    /// Pause between a failed poll cycle and the next attempt
    /// Default: 1 second
    pub retry_pause: Duration,

    /// Number of back-to-back failed cycles after which the loop gives up
    /// Default: 5
    pub max_consecutive_errors: u32,

    /// Capacity of the bounded event channel
    /// Default: 100
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(10),
            request_grace: Duration::from_secs(5),
            retry_pause: Duration::from_secs(1),
            max_consecutive_errors: 5,
            channel_capacity: 100,
        }
    }
}

impl StreamConfig {
    /// Create a new StreamConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Short poll and retry intervals, for development against a local speaker
    pub fn fast() -> Self {
        Self {
            poll_timeout: Duration::from_secs(1),
            request_grace: Duration::from_secs(1),
            retry_pause: Duration::from_millis(100),
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.poll_timeout.is_zero() {
            return Err(StreamError::Configuration(
                "Poll timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_consecutive_errors == 0 {
            return Err(StreamError::Configuration(
                "Max consecutive errors must be greater than 0".to_string(),
            ));
        }

        if self.channel_capacity == 0 {
            return Err(StreamError::Configuration(
                "Channel capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The `timeout` query parameter sent with each poll, in whole seconds
    pub fn poll_timeout_secs(&self) -> u64 {
        self.poll_timeout.as_secs().max(1)
    }

    /// Upper bound on a single poll request
    pub fn cycle_deadline(&self) -> Duration {
        self.poll_timeout.saturating_add(self.request_grace)
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn with_request_grace(mut self, grace: Duration) -> Self {
        self.request_grace = grace;
        self
    }

    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }

    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.poll_timeout, Duration::from_secs(10));
        assert_eq!(config.retry_pause, Duration::from_secs(1));
        assert_eq!(config.max_consecutive_errors, 5);
        assert_eq!(config.channel_capacity, 100);
        assert_eq!(config.cycle_deadline(), Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(StreamConfig::new().with_channel_capacity(0).validate().is_err());
        assert!(StreamConfig::new().with_max_consecutive_errors(0).validate().is_err());
        assert!(StreamConfig::new()
            .with_poll_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(StreamConfig::fast().validate().is_ok());
    }

    #[test]
    fn test_poll_timeout_secs_rounds_up_to_one() {
        let config = StreamConfig::new().with_poll_timeout(Duration::from_millis(200));
        assert_eq!(config.poll_timeout_secs(), 1);
        assert_eq!(StreamConfig::default().poll_timeout_secs(), 10);
    }

    #[test]
    fn test_builder_pattern() {
        let config = StreamConfig::new()
            .with_poll_timeout(Duration::from_secs(3))
            .with_request_grace(Duration::from_secs(2))
            .with_retry_pause(Duration::from_millis(250))
            .with_max_consecutive_errors(8)
            .with_channel_capacity(16);

        assert_eq!(config.cycle_deadline(), Duration::from_secs(5));
        assert_eq!(config.retry_pause, Duration::from_millis(250));
        assert_eq!(config.max_consecutive_errors, 8);
        assert_eq!(config.channel_capacity, 16);
        assert!(config.validate().is_ok());
    }
}
