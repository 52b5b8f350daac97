//! Shared calculator state and the projection queries

use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::CalculatorConfig;
use crate::history::{per_unit, scale, PeriodHistory};
use crate::report::EtaReport;

/// Thread-safe ETA calculator for a counted task.
///
/// Cloning is cheap and hands out another handle to the same task: one
/// producer typically calls [`increment`](Self::increment) while any number
/// of consumers poll the projection queries. Every query returns
/// `Option<SystemTime>`, where `None` is the "no estimate yet" sentinel —
/// there are no error paths.
#[derive(Debug, Clone)]
pub struct Calculator {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    start_time: SystemTime,
    total_count: u64,
    config: CalculatorConfig,
    state: RwLock<State>,
}

/// Mutable fields, all guarded by the one lock in [`Shared`].
#[derive(Debug)]
struct State {
    processed: u64,
    current_period: SystemTime,
    current_processed: u64,
    history: PeriodHistory,
}

impl Calculator {
    /// Create a calculator with the default bucketing configuration.
    #[must_use]
    pub fn new(total_count: u64) -> Self {
        Self::with_config(total_count, CalculatorConfig::default())
    }

    /// Create a calculator with a custom bucketing configuration.
    ///
    /// Construction never fails; out-of-range configuration values are
    /// clamped to usable bounds.
    #[must_use]
    pub fn with_config(total_count: u64, config: CalculatorConfig) -> Self {
        Self::new_at(total_count, config, SystemTime::now())
    }

    fn new_at(total_count: u64, config: CalculatorConfig, now: SystemTime) -> Self {
        let config = config.normalized();
        Self {
            shared: Arc::new(Shared {
                start_time: now,
                total_count,
                config,
                state: RwLock::new(State {
                    processed: 0,
                    current_period: truncate(now, config.period_duration),
                    current_processed: 0,
                    history: PeriodHistory::new(config.period_count),
                }),
            }),
        }
    }

    /// Target number of work units.
    pub fn total_count(&self) -> u64 {
        self.shared.total_count
    }

    /// Instant the calculator was created.
    pub fn start_time(&self) -> SystemTime {
        self.shared.start_time
    }

    /// Bucketing configuration in effect (after clamping).
    pub fn config(&self) -> CalculatorConfig {
        self.shared.config
    }

    /// Units processed so far.
    pub fn processed(&self) -> u64 {
        self.shared.state.read().map_or(0, |state| state.processed)
    }

    /// Record `n` more completed units. Zero is a no-op.
    pub fn increment(&self, n: u64) {
        self.increment_at(n, SystemTime::now());
    }

    fn increment_at(&self, n: u64, now: SystemTime) {
        if n == 0 {
            return;
        }
        let Ok(mut state) = self.shared.state.write() else {
            return;
        };

        state.processed = state.processed.saturating_add(n);
        tracing::trace!(n, processed = state.processed, "progress recorded");

        let period = truncate(now, self.shared.config.period_duration);
        if state.current_period == period {
            state.current_processed = state.current_processed.saturating_add(n);
        } else {
            // The increment that crosses a boundary closes the old bucket
            // with its accumulated total and lands in no bucket itself; it
            // is counted in `processed` only.
            let closed = state.current_processed;
            state.history.push(closed);
            state.current_processed = 0;
            state.current_period = period;
            tracing::debug!(closed, "throughput bucket closed");
        }
    }

    /// ETA from the average speed over the whole task lifetime.
    ///
    /// Returns `None` until the first unit of progress is recorded.
    pub fn eta(&self) -> Option<SystemTime> {
        let now = SystemTime::now();
        let state = self.shared.state.read().ok()?;
        self.eta_locked(&state, now)
    }

    /// ETA from the speed of the most recently closed bucket.
    ///
    /// Returns `None` until progress is recorded and a bucket has closed,
    /// and when the most recent bucket closed with a zero count.
    pub fn last(&self) -> Option<SystemTime> {
        let now = SystemTime::now();
        let state = self.shared.state.read().ok()?;
        self.last_locked(&state, now)
    }

    /// ETA from the average speed across all retained buckets.
    ///
    /// Falls back to the whole-lifetime average while no bucket has closed
    /// yet; returns `None` when every retained bucket is empty.
    pub fn average(&self) -> Option<SystemTime> {
        let now = SystemTime::now();
        let state = self.shared.state.read().ok()?;
        self.average_locked(&state, now)
    }

    /// ETA from the fastest speed observed in any retained bucket.
    ///
    /// Falls back to the whole-lifetime average while no bucket has closed
    /// yet; returns `None` when no usable bucket speed exists.
    pub fn optimistic(&self) -> Option<SystemTime> {
        let now = SystemTime::now();
        let state = self.shared.state.read().ok()?;
        self.optimistic_locked(&state, now)
    }

    /// ETA from the slowest speed observed in any retained bucket, inflated
    /// by the number of stalled (zero-count) buckets.
    ///
    /// Falls back to the whole-lifetime average while no bucket has closed
    /// yet; returns `None` when no usable bucket speed exists.
    pub fn pessimistic(&self) -> Option<SystemTime> {
        let now = SystemTime::now();
        let state = self.shared.state.read().ok()?;
        self.pessimistic_locked(&state, now)
    }

    /// Capture every projection plus the raw counters under one read lock.
    pub fn report(&self) -> EtaReport {
        let now = SystemTime::now();
        let Ok(state) = self.shared.state.read() else {
            return EtaReport {
                processed: 0,
                total_count: self.shared.total_count,
                eta: None,
                last: None,
                average: None,
                optimistic: None,
                pessimistic: None,
            };
        };
        EtaReport {
            processed: state.processed,
            total_count: self.shared.total_count,
            eta: self.eta_locked(&state, now),
            last: self.last_locked(&state, now),
            average: self.average_locked(&state, now),
            optimistic: self.optimistic_locked(&state, now),
            pessimistic: self.pessimistic_locked(&state, now),
        }
    }

    fn eta_locked(&self, state: &State, now: SystemTime) -> Option<SystemTime> {
        if state.processed == 0 {
            return None;
        }
        let elapsed = now
            .duration_since(self.shared.start_time)
            .unwrap_or_default();
        let cycle = per_unit(elapsed, state.processed);
        project(now, scale(cycle, self.remaining(state)))
    }

    fn last_locked(&self, state: &State, now: SystemTime) -> Option<SystemTime> {
        if state.processed == 0 {
            return None;
        }
        let newest = state.history.newest()?;
        if newest == 0 {
            return None;
        }
        let cycle = per_unit(self.shared.config.period_duration, newest);
        project(now, scale(cycle, self.remaining(state)))
    }

    fn average_locked(&self, state: &State, now: SystemTime) -> Option<SystemTime> {
        if state.history.is_empty() {
            return self.eta_locked(state, now);
        }
        let total = state.history.total();
        if total == 0 {
            return None;
        }
        let span = state.history.span(self.shared.config.period_duration);
        let cycle = per_unit(span, total);
        project(now, scale(cycle, self.remaining(state)))
    }

    fn optimistic_locked(&self, state: &State, now: SystemTime) -> Option<SystemTime> {
        if state.history.is_empty() {
            return self.eta_locked(state, now);
        }
        let cycle = state
            .history
            .fastest_cycle(self.shared.config.period_duration);
        if cycle == Duration::ZERO {
            return None;
        }
        project(now, scale(cycle, self.remaining(state)))
    }

    fn pessimistic_locked(&self, state: &State, now: SystemTime) -> Option<SystemTime> {
        if state.history.is_empty() {
            return self.eta_locked(state, now);
        }
        let (cycle, stalled) = state
            .history
            .slowest_cycle(self.shared.config.period_duration);
        if cycle == Duration::ZERO {
            return None;
        }
        let projected = scale(scale(cycle, self.remaining(state)), 1 + stalled);
        project(now, projected)
    }

    fn remaining(&self, state: &State) -> u64 {
        self.shared.total_count.saturating_sub(state.processed)
    }
}

/// Truncate a wall-clock instant down to a period boundary. Boundaries are
/// anchored at the Unix epoch.
fn truncate(t: SystemTime, period: Duration) -> SystemTime {
    let since_epoch = t.duration_since(UNIX_EPOCH).unwrap_or_default();
    let period_nanos = since_epoch.as_nanos() % period.as_nanos().max(1);
    let truncated = since_epoch.as_nanos() - period_nanos;
    u64::try_from(truncated).map_or(t, |nanos| UNIX_EPOCH + Duration::from_nanos(nanos))
}

/// Project a completion instant, degrading far-future overflow to the
/// unknown sentinel.
fn project(now: SystemTime, remaining_time: Duration) -> Option<SystemTime> {
    now.checked_add(remaining_time)
}
