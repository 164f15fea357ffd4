//! Real-time synchronizer: maps wall-clock time to tick advancement
//!
//! Poll/check model: the host calls `check` at least as often as the
//! configured interval, and each call settles however many simulated hours
//! have come due since the last one. Sparse calls catch up; they never
//! fail. Wall-clock "now" is always passed in, so none of this needs a
//! timer to test.

use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::core::error::{Result, SimError};

/// Named tick rates, in real milliseconds per simulated hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickRate {
    /// One simulated hour per real hour
    Realtime,
    /// One simulated hour per five real minutes
    Slow,
    /// One simulated hour per real minute
    Fast,
    /// One simulated hour per ten real seconds
    VeryFast,
    /// One simulated hour per real second
    Test,
    Custom(u64),
}

impl TickRate {
    pub fn interval_ms(&self) -> u64 {
        match self {
            TickRate::Realtime => 3_600_000,
            TickRate::Slow => 300_000,
            TickRate::Fast => 60_000,
            TickRate::VeryFast => 10_000,
            TickRate::Test => 1_000,
            TickRate::Custom(ms) => *ms,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TickRate::Realtime => "realtime",
            TickRate::Slow => "slow",
            TickRate::Fast => "fast",
            TickRate::VeryFast => "very_fast",
            TickRate::Test => "test",
            TickRate::Custom(_) => "custom",
        }
    }

    /// Parse a named rate or a raw millisecond interval
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "realtime" => Ok(TickRate::Realtime),
            "slow" => Ok(TickRate::Slow),
            "fast" => Ok(TickRate::Fast),
            "very_fast" => Ok(TickRate::VeryFast),
            "test" => Ok(TickRate::Test),
            other => other.parse::<u64>().map(TickRate::Custom).map_err(|_| {
                SimError::Validation(format!(
                    "unknown rate '{other}'; use realtime, slow, fast, very_fast, test, or a millisecond count"
                ))
            }),
        }
    }
}

/// Autoticker state: mutated only by start/stop/rate changes and `check`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Autoticker {
    pub enabled: bool,
    pub interval_ms: u64,
    pub last_check_ms: i64,
    pub next_due_ms: i64,
}

/// Snapshot for the control surface
#[derive(Debug, Clone, Serialize)]
pub struct AutotickerStatus {
    pub enabled: bool,
    pub interval_ms: u64,
    pub rate: &'static str,
    pub ms_until_next: i64,
}

impl Default for Autoticker {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: TickRate::Realtime.interval_ms(),
            last_check_ms: 0,
            next_due_ms: 0,
        }
    }
}

impl Autoticker {
    /// Enable, with the first tick due one full interval from now
    pub fn start(&mut self, now_ms: i64) -> Result<()> {
        if self.enabled {
            return Err(SimError::Validation("autoticker is already running".into()));
        }
        self.enabled = true;
        self.last_check_ms = now_ms;
        self.next_due_ms = now_ms + self.interval_ms as i64;
        tracing::info!(interval_ms = self.interval_ms, "autoticker started");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if !self.enabled {
            return Err(SimError::Validation("autoticker is not running".into()));
        }
        self.enabled = false;
        tracing::info!("autoticker stopped");
        Ok(())
    }

    /// Change the interval; an enabled ticker reschedules from now
    pub fn set_rate(&mut self, rate: TickRate, now_ms: i64) -> Result<()> {
        let interval = rate.interval_ms();
        let min = config().min_tick_interval_ms;
        if interval < min {
            return Err(SimError::Validation(format!(
                "tick interval {interval}ms is below the {min}ms minimum"
            )));
        }
        self.interval_ms = interval;
        if self.enabled {
            self.next_due_ms = now_ms + interval as i64;
        }
        tracing::info!(rate = rate.name(), interval_ms = interval, "tick rate set");
        Ok(())
    }

    /// How many simulated hours have come due at `now_ms`
    ///
    /// Reschedules on the fixed phase grid, so sparse invocations settle
    /// every missed interval and frequent ones settle at most one each.
    pub fn hours_due(&mut self, now_ms: i64) -> u64 {
        self.last_check_ms = now_ms;
        if !self.enabled || now_ms < self.next_due_ms {
            return 0;
        }
        let interval = self.interval_ms as i64;
        let due = (now_ms - self.next_due_ms) / interval + 1;
        self.next_due_ms += due * interval;
        due as u64
    }

    pub fn current_rate(&self) -> TickRate {
        match self.interval_ms {
            3_600_000 => TickRate::Realtime,
            300_000 => TickRate::Slow,
            60_000 => TickRate::Fast,
            10_000 => TickRate::VeryFast,
            1_000 => TickRate::Test,
            ms => TickRate::Custom(ms),
        }
    }

    pub fn status(&self, now_ms: i64) -> AutotickerStatus {
        AutotickerStatus {
            enabled: self.enabled,
            interval_ms: self.interval_ms,
            rate: self.current_rate().name(),
            ms_until_next: (self.next_due_ms - now_ms).max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_rate_table() {
        assert_eq!(TickRate::Realtime.interval_ms(), 3_600_000);
        assert_eq!(TickRate::Slow.interval_ms(), 300_000);
        assert_eq!(TickRate::Fast.interval_ms(), 60_000);
        assert_eq!(TickRate::VeryFast.interval_ms(), 10_000);
        assert_eq!(TickRate::Test.interval_ms(), 1_000);
    }

    #[test]
    fn test_parse_named_and_custom() {
        assert_eq!(TickRate::parse("fast").unwrap(), TickRate::Fast);
        assert_eq!(TickRate::parse("2500").unwrap(), TickRate::Custom(2500));
        assert!(TickRate::parse("warp").is_err());
    }

    #[test]
    fn test_five_checks_five_hours() {
        let mut ticker = Autoticker::default();
        ticker.set_rate(TickRate::Test, 0).unwrap();
        ticker.start(0).unwrap();

        let mut total = 0;
        for i in 1..=5 {
            total += ticker.hours_due(i * 1_100);
        }
        assert_eq!(total, 5);
    }

    #[test]
    fn test_sparse_check_catches_up() {
        let mut ticker = Autoticker::default();
        ticker.set_rate(TickRate::Test, 0).unwrap();
        ticker.start(0).unwrap();

        assert_eq!(ticker.hours_due(5_500), 5);
        assert_eq!(ticker.next_due_ms, 6_000);
        // The next prompt check owes nothing
        assert_eq!(ticker.hours_due(5_600), 0);
    }

    #[test]
    fn test_disabled_ticker_owes_nothing() {
        let mut ticker = Autoticker::default();
        assert_eq!(ticker.hours_due(1_000_000), 0);
    }

    #[test]
    fn test_sub_second_interval_rejected() {
        let mut ticker = Autoticker::default();
        assert!(ticker.set_rate(TickRate::Custom(10), 0).is_err());
    }

    #[test]
    fn test_double_start_rejected() {
        let mut ticker = Autoticker::default();
        ticker.start(0).unwrap();
        assert!(ticker.start(10).is_err());
    }
}
