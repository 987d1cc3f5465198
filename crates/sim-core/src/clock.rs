//! Simulated clock mapping discrete ticks onto calendar time.
//!
//! A simulated day is compressed into a configurable tick budget: at the
//! normal run rate of 72 000 ticks/day and 50 ms wall-clock pacing, one real
//! hour covers one simulated day. Populate mode coarsens the budget to
//! fast-forward history; `tick_scale` keeps statistical properties invariant
//! across rates (probabilities scale linearly, Gaussian noise by
//! sqrt(tick_scale), decay rates are raised to tick_scale).

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use types::Timestamp;

use crate::error::{Result, SimCoreError};

/// Milliseconds in one simulated day.
const MS_PER_DAY: u64 = 86_400_000;

/// Cheap shared view of the simulated time, handed to order books so they can
/// stamp and expire orders without borrowing the clock itself.
#[derive(Debug, Clone)]
pub struct ClockHandle {
    now_ms: Arc<AtomicU64>,
}

impl ClockHandle {
    /// Current simulated time in epoch milliseconds.
    #[inline]
    pub fn now(&self) -> Timestamp {
        self.now_ms.load(Ordering::Relaxed)
    }
}

/// Deterministic simulated clock.
#[derive(Debug)]
pub struct SimClock {
    start_time_ms: Timestamp,
    sim_time_ms: Timestamp,
    ticks_per_day: u32,
    /// Rate against which `tick_scale` is measured; equals the normal run
    /// rate so a normal run has tick_scale = 1.
    reference_ticks_per_day: u32,
    tick_in_day: u32,
    total_ticks: u64,
    shared_now: Arc<AtomicU64>,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            start_time_ms: 0,
            sim_time_ms: 0,
            ticks_per_day: 72_000,
            reference_ticks_per_day: 72_000,
            tick_in_day: 0,
            total_ticks: 0,
            shared_now: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fix the start date and tick budget, resetting all counters.
    ///
    /// The reference rate is pinned to `ticks_per_day` so the run starts at
    /// tick_scale = 1; populate mode overrides it per phase.
    pub fn initialize(&mut self, start_date: &str, ticks_per_day: u32) -> Result<()> {
        self.start_time_ms = Self::parse_date(start_date)?;
        self.sim_time_ms = self.start_time_ms;
        self.ticks_per_day = ticks_per_day.max(1);
        self.reference_ticks_per_day = self.ticks_per_day;
        self.tick_in_day = 0;
        self.total_ticks = 0;
        self.shared_now.store(self.sim_time_ms, Ordering::Relaxed);
        Ok(())
    }

    /// Advance by one tick; returns the new simulated timestamp.
    pub fn tick(&mut self) -> Timestamp {
        self.total_ticks += 1;
        self.tick_in_day += 1;
        if self.tick_in_day >= self.ticks_per_day {
            self.tick_in_day = 0;
        }

        self.sim_time_ms += self.sim_ms_per_tick();
        self.shared_now.store(self.sim_time_ms, Ordering::Relaxed);
        self.sim_time_ms
    }

    /// Simulated milliseconds covered by one tick (integer truncated).
    #[inline]
    pub fn sim_ms_per_tick(&self) -> u64 {
        MS_PER_DAY / self.ticks_per_day as u64
    }

    /// Ratio of the reference rate to the current rate. Used to keep per-tick
    /// rates and noise variances invariant under tick-rate changes.
    #[inline]
    pub fn tick_scale(&self) -> f64 {
        self.reference_ticks_per_day as f64 / self.ticks_per_day as f64
    }

    /// True exactly once per simulated day, on the first tick of the day.
    pub fn is_new_day(&self) -> bool {
        self.tick_in_day == 0 && self.total_ticks > 0
    }

    pub fn ticks_per_day(&self) -> u32 {
        self.ticks_per_day
    }

    pub fn set_ticks_per_day(&mut self, ticks_per_day: u32) {
        self.ticks_per_day = ticks_per_day.max(1);
    }

    pub fn set_reference_ticks_per_day(&mut self, ticks_per_day: u32) {
        self.reference_ticks_per_day = ticks_per_day.max(1);
    }

    pub fn tick_in_day(&self) -> u32 {
        self.tick_in_day
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time_ms
    }

    /// Current simulated timestamp in epoch milliseconds.
    #[inline]
    pub fn current_timestamp(&self) -> Timestamp {
        self.sim_time_ms
    }

    /// Shared handle for components that need the current simulated time
    /// without holding a reference to the clock.
    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            now_ms: Arc::clone(&self.shared_now),
        }
    }

    /// Parse a strict ISO `YYYY-MM-DD` date; time-of-day is pinned to the
    /// 09:30:00 UTC market open.
    pub fn parse_date(date: &str) -> Result<Timestamp> {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| SimCoreError::InvalidDate(date.to_string()))?;
        let open = parsed
            .and_hms_opt(9, 30, 0)
            .ok_or_else(|| SimCoreError::InvalidDate(date.to_string()))?;
        Ok(open.and_utc().timestamp_millis() as Timestamp)
    }

    /// Format epoch milliseconds as `YYYY-MM-DD`.
    pub fn format_date(ms: Timestamp) -> String {
        Self::utc(ms).format("%Y-%m-%d").to_string()
    }

    /// Format epoch milliseconds as a full ISO datetime.
    pub fn format_date_time(ms: Timestamp) -> String {
        Self::utc(ms).format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Current simulated date as `YYYY-MM-DD`.
    pub fn current_date_string(&self) -> String {
        Self::format_date(self.sim_time_ms)
    }

    /// Current simulated datetime as an ISO string.
    pub fn current_date_time_string(&self) -> String {
        Self::format_date_time(self.sim_time_ms)
    }

    fn utc(ms: Timestamp) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(ms as i64).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_pins_market_open() {
        let ms = SimClock::parse_date("2025-01-01").unwrap();
        assert_eq!(SimClock::format_date_time(ms), "2025-01-01T09:30:00Z");
    }

    #[test]
    fn parse_date_rejects_malformed() {
        assert!(SimClock::parse_date("2025-13-01").is_err());
        assert!(SimClock::parse_date("not-a-date").is_err());
        assert!(SimClock::parse_date("2025/01/01").is_err());
        assert!(SimClock::parse_date("").is_err());
    }

    #[test]
    fn format_parse_round_trip() {
        for date in ["2024-02-29", "2025-08-07", "1999-12-31"] {
            let ms = SimClock::parse_date(date).unwrap();
            assert_eq!(SimClock::format_date(ms), date);
        }
    }

    #[test]
    fn tick_advances_by_exact_budget() {
        let mut clock = SimClock::new();
        clock.initialize("2025-01-01", 72_000).unwrap();
        let start = clock.current_timestamp();

        for _ in 0..100 {
            clock.tick();
        }

        // 86_400_000 / 72_000 = 1200 ms per tick
        assert_eq!(clock.current_timestamp(), start + 100 * 1200);
        assert_eq!(clock.total_ticks(), 100);
    }

    #[test]
    fn scaling_holds_at_any_rate() {
        for tpd in [200u32, 576, 1440, 72_000] {
            let mut clock = SimClock::new();
            clock.initialize("2025-01-01", tpd).unwrap();
            let start = clock.current_timestamp();
            let n = 2_500u64;
            for _ in 0..n {
                clock.tick();
            }
            assert_eq!(
                clock.current_timestamp() - start,
                n * (86_400_000 / tpd as u64)
            );
        }
    }

    #[test]
    fn new_day_fires_on_rollover_only() {
        let mut clock = SimClock::new();
        clock.initialize("2025-01-01", 10).unwrap();

        assert!(!clock.is_new_day()); // before any tick
        for _ in 0..9 {
            clock.tick();
            assert!(!clock.is_new_day());
        }
        clock.tick(); // tick 10 rolls the day
        assert!(clock.is_new_day());
        clock.tick();
        assert!(!clock.is_new_day());
    }

    #[test]
    fn tick_scale_tracks_reference_rate() {
        let mut clock = SimClock::new();
        clock.initialize("2025-01-01", 200).unwrap();
        assert_eq!(clock.tick_scale(), 1.0);

        clock.set_ticks_per_day(72_000);
        assert!((clock.tick_scale() - 200.0 / 72_000.0).abs() < 1e-12);
    }

    #[test]
    fn handle_tracks_ticks() {
        let mut clock = SimClock::new();
        clock.initialize("2025-01-01", 72_000).unwrap();
        let handle = clock.handle();
        let before = handle.now();
        clock.tick();
        assert_eq!(handle.now(), before + 1200);
    }
}
