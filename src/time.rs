//! Clock abstraction for payload timestamps

use crate::error::FinanceError;
use crate::Result;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in a fixed IANA zone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| FinanceError::InvalidTimezone(name.to_string()))?;
        Ok(Self::new(tz))
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(chrono_tz::America::Sao_Paulo)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.tz).fixed_offset()
    }
}

/// Clock frozen at one instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// ISO-8601 with offset, second precision.
pub fn to_ts_iso(ts: DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ts_iso_keeps_offset() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let ts = offset.with_ymd_and_hms(2026, 10, 19, 9, 30, 5).unwrap();
        assert_eq!(to_ts_iso(ts), "2026-10-19T09:30:05-03:00");
    }

    #[test]
    fn test_system_clock_zone() {
        let clock = SystemClock::from_name("America/Sao_Paulo").unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), -3 * 3600);
        assert!(SystemClock::from_name("Mars/Olympus").is_err());
    }
}
