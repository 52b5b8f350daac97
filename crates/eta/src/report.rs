//! Point-in-time progress snapshots

use serde::Serialize;
use std::time::SystemTime;

use crate::utils::{calculate_percentage, format_duration};

/// Every projection plus the raw counters, captured under one read lock by
/// [`Calculator::report`](crate::Calculator::report).
#[derive(Debug, Clone, Serialize)]
pub struct EtaReport {
    /// Units processed so far
    pub processed: u64,
    /// Target number of units
    pub total_count: u64,
    /// Whole-lifetime average projection
    pub eta: Option<SystemTime>,
    /// Last-closed-bucket projection
    pub last: Option<SystemTime>,
    /// Retained-history average projection
    pub average: Option<SystemTime>,
    /// Fastest-observed-bucket projection
    pub optimistic: Option<SystemTime>,
    /// Slowest-observed-bucket projection, inflated for stalls
    pub pessimistic: Option<SystemTime>,
}

impl EtaReport {
    /// Progress as a percentage (0.0-100.0)
    #[must_use]
    pub fn percentage(&self) -> f64 {
        calculate_percentage(self.processed, self.total_count)
    }

    /// Units left to process
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.total_count.saturating_sub(self.processed)
    }

    /// Whether the target count has been reached
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total_count
    }

    /// Format the whole-lifetime projection relative to `now`, or
    /// `"unknown"` when no estimate exists yet.
    #[must_use]
    pub fn format_eta(&self, now: SystemTime) -> String {
        match self.eta {
            Some(when) => match when.duration_since(now) {
                Ok(left) => format_duration(left),
                Err(_) => "0s".to_string(),
            },
            None => "unknown".to_string(),
        }
    }
}
