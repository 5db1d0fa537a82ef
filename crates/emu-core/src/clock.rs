//! Fixed-timestep accumulator clock.

use std::time::Duration;

/// Converts elapsed wall-clock time into due ticks at a fixed rate.
///
/// Feed it elapsed time with [`advance`](Self::advance); it returns how many
/// ticks that time affords at the configured rate and carries the remainder
/// forward at nanosecond resolution, so no time is lost across passes and
/// the long-run tick rate is exact.
///
/// Time is always injected by the caller — the accumulator never reads a
/// global clock — so schedulers built on it are testable deterministically.
#[derive(Debug, Clone)]
pub struct FixedStep {
    /// Tick period in nanoseconds.
    period_ns: u64,
    /// Unspent elapsed time, always less than one period.
    accumulator_ns: u64,
}

impl FixedStep {
    /// Create an accumulator ticking at `rate_hz`.
    ///
    /// # Panics
    ///
    /// Panics if `rate_hz` is zero.
    #[must_use]
    pub fn new(rate_hz: u32) -> Self {
        assert!(rate_hz > 0, "tick rate must be non-zero");
        Self {
            period_ns: 1_000_000_000 / u64::from(rate_hz),
            accumulator_ns: 0,
        }
    }

    /// One tick period.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_nanos(self.period_ns)
    }

    /// Add elapsed time and return the number of ticks now due.
    pub fn advance(&mut self, elapsed: Duration) -> u64 {
        self.accumulator_ns = self
            .accumulator_ns
            .saturating_add(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX));
        let due = self.accumulator_ns / self.period_ns;
        self.accumulator_ns %= self.period_ns;
        due
    }

    /// Time until the next tick falls due, assuming no further elapsed time.
    #[must_use]
    pub fn until_next(&self) -> Duration {
        Duration::from_nanos(self.period_ns - self.accumulator_ns)
    }

    /// Discard any banked time. Used after a pause so the backlog is not
    /// replayed as a burst.
    pub fn rewind(&mut self) {
        self.accumulator_ns = 0;
    }
}
