//! Configuration for the lifecycle monitor.
//!
//! Parameters are validated with `nutype` at construction time, so an
//! invalid configuration can never reach the monitor. The configuration
//! is `serde`-(de)serialisable so hosts can embed it in their own files.

use nutype::nutype;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Age in milliseconds after which a live resource counts as long-lived.
///
/// Validated to be between 1ms and 24 hours.
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 86_400_000),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct LongLivedThresholdMs(u64);

impl LongLivedThresholdMs {
    /// Convert to a `Duration` for age comparisons.
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.into())
    }
}

/// Lifecycle monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Resources registered for longer than this are reported by
    /// `LifecycleMonitor::long_lived`.
    pub long_lived_threshold: LongLivedThresholdMs,
    /// Reject `ExclusiveOwner::from_raw` on addresses that are already owned.
    pub detect_double_ownership: bool,
}

impl MonitorConfig {
    /// Create a monitor configuration with safe defaults.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the default threshold is out of range
    /// (which should never happen with proper constants).
    pub fn new() -> Result<Self, LongLivedThresholdMsError> {
        Ok(Self {
            long_lived_threshold: LongLivedThresholdMs::try_new(60_000)?,
            detect_double_ownership: true,
        })
    }

    /// Set the long-lived threshold.
    #[must_use]
    pub const fn with_long_lived_threshold(mut self, threshold: LongLivedThresholdMs) -> Self {
        self.long_lived_threshold = threshold;
        self
    }

    /// Turn double ownership detection on or off.
    #[must_use]
    pub const fn with_double_ownership_detection(mut self, enabled: bool) -> Self {
        self.detect_double_ownership = enabled;
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new().expect("Default monitor configuration should always be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_validation() {
        assert!(LongLivedThresholdMs::try_new(1).is_ok());
        assert!(LongLivedThresholdMs::try_new(86_400_000).is_ok());

        assert!(LongLivedThresholdMs::try_new(0).is_err());
        assert!(LongLivedThresholdMs::try_new(86_400_001).is_err());
    }

    #[test]
    fn default_config_detects_double_ownership() {
        let config = MonitorConfig::default();
        assert!(config.detect_double_ownership);
        assert_eq!(
            config.long_lived_threshold.as_duration(),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = MonitorConfig::default()
            .with_long_lived_threshold(LongLivedThresholdMs::try_new(250).unwrap())
            .with_double_ownership_detection(false);

        assert!(!config.detect_double_ownership);
        let threshold: u64 = config.long_lived_threshold.into();
        assert_eq!(threshold, 250);
    }

    #[test]
    fn config_round_trips_through_json() {
        let json = r#"{"long_lived_threshold":500,"detect_double_ownership":false}"#;
        let config: MonitorConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.long_lived_threshold.as_duration(),
            Duration::from_millis(500)
        );
        assert_eq!(serde_json::to_string(&config).unwrap(), json);
    }

    #[test]
    fn invalid_threshold_is_rejected_on_deserialize() {
        let json = r#"{"long_lived_threshold":0,"detect_double_ownership":true}"#;
        assert!(serde_json::from_str::<MonitorConfig>(json).is_err());
    }
}
