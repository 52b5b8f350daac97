#![deny(clippy::pedantic, unsafe_code)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,        // Percentage math requires f64
    clippy::must_use_candidate          // Many accessors are self-evident
)]

//! Completion-time estimation for long-running counted tasks
//!
//! This crate accumulates a running count of completed work units, buckets
//! throughput into fixed-width time periods, and derives several speed-based
//! projections of when the task will finish:
//!
//! - Overall-average projection since the task started
//! - Last-closed-bucket projection (most recent trend only)
//! - History-average projection over all retained buckets
//! - Optimistic projection from the fastest observed bucket
//! - Pessimistic projection from the slowest observed bucket, inflated for
//!   stalled periods
//!
//! The calculator is a cheap-clone handle intended to be shared across
//! threads: one producer reports increments while any number of consumers
//! poll the projections. There are no error paths anywhere; every degenerate
//! input (zero progress, empty history, stalled buckets) surfaces as the
//! `None` "unknown" sentinel instead.
//!
//! # Usage Example
//!
//! ```rust
//! use eta::Calculator;
//!
//! let calc = Calculator::new(1000);
//!
//! calc.increment(10);
//!
//! if let Some(when) = calc.eta() {
//!     println!("expect completion around {when:?}");
//! }
//!
//! let report = calc.report();
//! println!("{:.1}% done", report.percentage());
//! ```

pub mod calculator;
pub mod config;
mod history;
pub mod report;

pub use calculator::Calculator;
pub use config::{CalculatorConfig, DEFAULT_PERIOD_COUNT, DEFAULT_PERIOD_DURATION};
pub use report::EtaReport;

/// Common progress utilities
pub mod utils {
    use std::time::Duration;

    /// Format a duration in human-readable form
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();

        if total_seconds < 60 {
            format!("{total_seconds}s")
        } else if total_seconds < 3600 {
            let minutes = total_seconds / 60;
            let seconds = total_seconds % 60;
            format!("{minutes}m {seconds}s")
        } else {
            let hours = total_seconds / 3600;
            let minutes = (total_seconds % 3600) / 60;
            format!("{hours}h {minutes}m")
        }
    }

    /// Calculate percentage with sub-percentage precision
    pub fn calculate_percentage(current: u64, total: u64) -> f64 {
        if total == 0 {
            return 100.0;
        }
        (current as f64 / total as f64) * 100.0
    }
}
