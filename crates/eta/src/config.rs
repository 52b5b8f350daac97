//! Configuration for throughput bucketing

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wall-clock width of one throughput bucket.
pub const DEFAULT_PERIOD_DURATION: Duration = Duration::from_secs(1);

/// Default number of closed buckets retained for trend analysis.
pub const DEFAULT_PERIOD_COUNT: usize = 60;

/// Narrower bucket widths are widened to this at construction.
const MIN_PERIOD_DURATION: Duration = Duration::from_millis(1);

/// Bucketing configuration for a [`Calculator`](crate::Calculator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Wall-clock width of one bucket (default: 1s)
    pub period_duration: Duration,
    /// Maximum number of closed buckets retained (default: 60)
    pub period_count: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            period_duration: DEFAULT_PERIOD_DURATION,
            period_count: DEFAULT_PERIOD_COUNT,
        }
    }
}

impl CalculatorConfig {
    /// Create a configuration with the default constants
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bucket width
    #[must_use]
    pub fn with_period_duration(mut self, period_duration: Duration) -> Self {
        self.period_duration = period_duration;
        self
    }

    /// Set the number of retained buckets
    #[must_use]
    pub fn with_period_count(mut self, period_count: usize) -> Self {
        self.period_count = period_count;
        self
    }

    /// Clamp to usable bounds: a zero-width bucket would turn every
    /// increment into a rollover, and a zero capacity would retain no
    /// history at all.
    pub(crate) fn normalized(self) -> Self {
        Self {
            period_duration: self.period_duration.max(MIN_PERIOD_DURATION),
            period_count: self.period_count.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = CalculatorConfig::default();
        assert_eq!(config.period_duration, DEFAULT_PERIOD_DURATION);
        assert_eq!(config.period_count, DEFAULT_PERIOD_COUNT);
    }

    #[test]
    fn builder_setters() {
        let config = CalculatorConfig::new()
            .with_period_duration(Duration::from_millis(250))
            .with_period_count(8);
        assert_eq!(config.period_duration, Duration::from_millis(250));
        assert_eq!(config.period_count, 8);
    }

    #[test]
    fn normalized_clamps_degenerate_values() {
        let config = CalculatorConfig::new()
            .with_period_duration(Duration::ZERO)
            .with_period_count(0)
            .normalized();
        assert_eq!(config.period_duration, MIN_PERIOD_DURATION);
        assert_eq!(config.period_count, 1);
    }

    #[test]
    fn serde_round_trip() {
        let config = CalculatorConfig::new()
            .with_period_duration(Duration::from_secs(5))
            .with_period_count(12);
        let json = serde_json::to_string(&config).unwrap();
        let back: CalculatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
