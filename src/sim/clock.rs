use chrono::{NaiveDateTime, TimeDelta};

/// A sampling clock that yields timestamps at a fixed cadence.
///
/// The `Clock` starts at a given instant and produces `total` timestamps,
/// each one `interval` after the previous. Both the occupancy simulator and
/// the forecast engine use it, so historical and forecast timestamps share
/// the same arithmetic.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use occupancy_forecast::sim::clock::Clock;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1)
///     .and_then(|d| d.and_hms_opt(8, 0, 0))
///     .unwrap();
/// let mut clock = Clock::new(start, TimeDelta::minutes(5), 3);
/// let mut minutes = Vec::new();
///
/// clock.run(|_, ts| minutes.push(ts.format("%H:%M").to_string()));
/// assert_eq!(minutes, vec!["08:00", "08:05", "08:10"]);
/// ```
pub struct Clock {
    /// Timestamp of the next tick
    next: NaiveDateTime,
    /// Spacing between ticks
    interval: TimeDelta,
    /// Number of ticks already emitted
    current: usize,
    /// Total ticks to emit
    total: usize,
}

impl Clock {
    /// Creates a clock whose first tick is `start`.
    ///
    /// # Arguments
    ///
    /// * `start` - Timestamp of the first tick
    /// * `interval` - Spacing between consecutive ticks
    /// * `total` - The total number of ticks the clock will emit
    pub fn new(start: NaiveDateTime, interval: TimeDelta, total: usize) -> Self {
        Self {
            next: start,
            interval,
            current: 0,
            total,
        }
    }

    /// Creates a clock whose first tick is one interval after `last`.
    ///
    /// Used to continue an observed series without gap or overlap.
    pub fn continuing(last: NaiveDateTime, interval: TimeDelta, total: usize) -> Self {
        Self::new(last + interval, interval, total)
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some((step, timestamp))` - The step index (starting from 0) and its timestamp
    /// * `None` - If the clock has emitted all of its ticks
    pub fn tick(&mut self) -> Option<(usize, NaiveDateTime)> {
        if self.current < self.total {
            let step = self.current;
            let ts = self.next;
            self.current += 1;
            self.next += self.interval;
            Some((step, ts))
        } else {
            None
        }
    }

    /// Runs a function for each remaining tick.
    ///
    /// # Arguments
    ///
    /// * `f` - A function that takes the step index and its timestamp
    pub fn run(&mut self, mut f: impl FnMut(usize, NaiveDateTime)) {
        while let Some((step, ts)) = self.tick() {
            f(step, ts);
        }
    }
}

impl Iterator for Clock {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        self.tick().map(|(_, ts)| ts)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.current;
        (remaining, Some(remaining))
    }
}
