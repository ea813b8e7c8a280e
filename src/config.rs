//! Test session configuration
//!
//! All timing knobs and the resolution threshold table are carried here so a
//! session can be tuned without touching the pipeline code. The defaults
//! match the production tuning.

use std::time::Duration;

use crate::quality::QualityThreshold;

/// Configuration for a quality test session
#[derive(Debug, Clone)]
pub struct QualityTestConfig {
    /// Total test duration; the final recommendation is emitted at this
    /// deadline
    pub test_duration: Duration,
    /// Publisher-side stats polling interval
    pub publisher_poll_interval: Duration,
    /// Subscriber-side stats polling interval
    pub subscriber_poll_interval: Duration,
    /// Interval between combined quality snapshot emissions
    pub quality_emit_interval: Duration,
    /// Minimum elapsed time between two samples of a subscriber window
    pub aggregation_window: Duration,
    /// Resolution recommendation thresholds, scanned in order
    pub thresholds: Vec<QualityThreshold>,
}

impl Default for QualityTestConfig {
    fn default() -> Self {
        Self {
            test_duration: Duration::from_secs(30),
            publisher_poll_interval: Duration::from_millis(500),
            subscriber_poll_interval: Duration::from_millis(500),
            quality_emit_interval: Duration::from_millis(1000),
            aggregation_window: Duration::from_millis(1000),
            thresholds: QualityThreshold::default_table(),
        }
    }
}

impl QualityTestConfig {
    /// Configuration with a custom test duration and default tuning otherwise
    pub fn with_duration(test_duration: Duration) -> Self {
        Self {
            test_duration,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning() {
        let config = QualityTestConfig::default();
        assert_eq!(config.test_duration, Duration::from_secs(30));
        assert_eq!(config.publisher_poll_interval, Duration::from_millis(500));
        assert_eq!(config.subscriber_poll_interval, Duration::from_millis(500));
        assert_eq!(config.quality_emit_interval, Duration::from_millis(1000));
        assert_eq!(config.aggregation_window, Duration::from_millis(1000));
        assert_eq!(config.thresholds.len(), 6);
    }

    #[test]
    fn test_with_duration_keeps_defaults() {
        let config = QualityTestConfig::with_duration(Duration::from_secs(5));
        assert_eq!(config.test_duration, Duration::from_secs(5));
        assert_eq!(config.publisher_poll_interval, Duration::from_millis(500));
    }
}
