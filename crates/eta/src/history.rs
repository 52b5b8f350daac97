//! Bounded history of closed throughput buckets

use std::collections::VecDeque;
use std::time::Duration;

/// Closed-bucket counts, most-recent-first, capped at a fixed capacity.
#[derive(Debug)]
pub(crate) struct PeriodHistory {
    buckets: VecDeque<u64>,
    capacity: usize,
}

impl PeriodHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            buckets: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a closed bucket. Newest entries sit at the front; the oldest
    /// fall off the back once the capacity is reached.
    pub fn push(&mut self, count: u64) {
        self.buckets.push_front(count);
        self.buckets.truncate(self.capacity);
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Count in the most recently closed bucket.
    pub fn newest(&self) -> Option<u64> {
        self.buckets.front().copied()
    }

    /// Sum of all retained bucket counts.
    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }

    /// Wall-clock span covered by the retained buckets.
    pub fn span(&self, period_duration: Duration) -> Duration {
        u32::try_from(self.len())
            .map_or(Duration::MAX, |periods| period_duration.saturating_mul(periods))
    }

    /// Fastest (smallest) per-unit cycle time over the comparison window.
    ///
    /// The newest closed bucket seeds the comparison; the scan then covers
    /// the buckets older than the seed's immediate predecessor, which never
    /// participates. A zero-count seed pins the result at zero, which
    /// callers treat as "no estimate".
    pub fn fastest_cycle(&self, period_duration: Duration) -> Duration {
        let mut fastest = self.seed_cycle(period_duration);
        for &count in self.buckets.iter().skip(2) {
            if count == 0 {
                continue;
            }
            let cycle = per_unit(period_duration, count);
            if cycle < fastest && cycle > Duration::ZERO {
                fastest = cycle;
            }
        }
        fastest
    }

    /// Slowest (largest) per-unit cycle time over the same comparison
    /// window, plus the number of stalled (zero-count) buckets seen there.
    pub fn slowest_cycle(&self, period_duration: Duration) -> (Duration, u64) {
        let mut slowest = self.seed_cycle(period_duration);
        let mut stalled = 0_u64;
        for &count in self.buckets.iter().skip(2) {
            if count == 0 {
                stalled += 1;
                continue;
            }
            let cycle = per_unit(period_duration, count);
            if cycle > slowest {
                slowest = cycle;
            }
        }
        (slowest, stalled)
    }

    fn seed_cycle(&self, period_duration: Duration) -> Duration {
        match self.newest() {
            Some(count) if count > 0 => per_unit(period_duration, count),
            _ => Duration::ZERO,
        }
    }
}

/// Time spent per work unit: integer division over nanoseconds.
pub(crate) fn per_unit(span: Duration, units: u64) -> Duration {
    if units == 0 {
        return Duration::ZERO;
    }
    let nanos = span.as_nanos() / u128::from(units);
    u64::try_from(nanos).map_or(Duration::MAX, Duration::from_nanos)
}

/// Scale a per-unit cycle by a unit count, saturating on overflow.
pub(crate) fn scale(cycle: Duration, units: u64) -> Duration {
    let nanos = cycle.as_nanos().saturating_mul(u128::from(units));
    u64::try_from(nanos).map_or(Duration::MAX, Duration::from_nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_secs(1);

    fn history_of(counts_oldest_first: &[u64]) -> PeriodHistory {
        let mut history = PeriodHistory::new(16);
        for &count in counts_oldest_first {
            history.push(count);
        }
        history
    }

    #[test]
    fn push_keeps_most_recent_first() {
        let history = history_of(&[1, 2, 3]);
        assert_eq!(history.newest(), Some(3));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut history = PeriodHistory::new(3);
        for count in 1..=10 {
            history.push(count);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.newest(), Some(10));
        assert_eq!(history.total(), 10 + 9 + 8);
    }

    #[test]
    fn span_counts_retained_periods() {
        let history = history_of(&[4, 4, 4, 4]);
        assert_eq!(history.span(PERIOD), Duration::from_secs(4));
    }

    #[test]
    fn per_unit_divides_nanos() {
        assert_eq!(per_unit(Duration::from_secs(1), 4), Duration::from_millis(250));
        assert_eq!(per_unit(Duration::from_secs(1), 0), Duration::ZERO);
    }

    #[test]
    fn scale_saturates() {
        assert_eq!(scale(Duration::from_millis(250), 4), Duration::from_secs(1));
        assert_eq!(scale(Duration::MAX, u64::MAX), Duration::MAX);
    }

    #[test]
    fn fastest_cycle_scans_window() {
        // Oldest-first: 20, 0, 5, 999, 10. Most-recent-first this is
        // [10, 999, 5, 0, 20]; 999 sits at index 1, outside the window.
        let history = history_of(&[20, 0, 5, 999, 10]);
        assert_eq!(history.fastest_cycle(PERIOD), per_unit(PERIOD, 20));
    }

    #[test]
    fn fastest_cycle_zero_seed_pins_result() {
        let history = history_of(&[8, 5, 0]);
        assert_eq!(history.fastest_cycle(PERIOD), Duration::ZERO);
    }

    #[test]
    fn slowest_cycle_counts_stalled_buckets() {
        // Most-recent-first: [10, 1, 5, 0, 0, 2].
        let history = history_of(&[2, 0, 0, 5, 1, 10]);
        let (cycle, stalled) = history.slowest_cycle(PERIOD);
        assert_eq!(cycle, per_unit(PERIOD, 2));
        assert_eq!(stalled, 2);
    }

    #[test]
    fn slowest_cycle_zero_seed_can_recover() {
        // A nonzero bucket in the window still beats a zero seed.
        let history = history_of(&[4, 9, 0]);
        let (cycle, stalled) = history.slowest_cycle(PERIOD);
        assert_eq!(cycle, per_unit(PERIOD, 4));
        assert_eq!(stalled, 0);
    }

    #[test]
    fn single_bucket_window_is_just_the_seed() {
        let history = history_of(&[7]);
        assert_eq!(history.fastest_cycle(PERIOD), per_unit(PERIOD, 7));
        assert_eq!(history.slowest_cycle(PERIOD), (per_unit(PERIOD, 7), 0));
    }
}
