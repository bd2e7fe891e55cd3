//! # Time Sources and Completion Timestamps
//!
//! Completion timestamps are always rendered in one fixed civil offset and one
//! format, independent of the server's local zone and of the caller. The
//! [`Clock`] capability is injected so tests can pin "now".

use crate::constants::system;
use crate::error::{SyncError, SyncResult};
use chrono::format::{Fixed, Item, Numeric, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use parking_lot::Mutex;
use std::fmt::Write;

/// Source of the current instant
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock() = instant;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.instant.lock();
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock()
    }
}

/// Fixed civil-time convention used for every completion timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CivilTimeFormat {
    offset: FixedOffset,
    pattern: String,
}

impl CivilTimeFormat {
    pub fn new(utc_offset_minutes: i32, pattern: impl Into<String>) -> SyncResult<Self> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                SyncError::Configuration(format!(
                    "UTC offset of {utc_offset_minutes} minutes is out of range"
                ))
            })?;
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(SyncError::Configuration(
                "timestamp format must not be empty".to_string(),
            ));
        }
        check_pattern(&pattern)?;
        Ok(Self { offset, pattern })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Convert an instant into the civil offset
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    pub fn format(&self, instant: DateTime<Utc>) -> String {
        let local = self.localize(instant);
        let mut rendered = String::new();
        match write!(rendered, "{}", local.format(&self.pattern)) {
            Ok(()) => rendered,
            Err(_) => local.to_rfc3339(),
        }
    }

    /// Parse a stored completion cell. The configured pattern is tried first
    /// (interpreted in the civil offset), then RFC 3339.
    pub fn parse(&self, value: &str) -> Option<DateTime<FixedOffset>> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, &self.pattern) {
            if let Some(parsed) = self.offset.from_local_datetime(&naive).single() {
                return Some(parsed);
            }
        }
        DateTime::parse_from_rfc3339(value).ok()
    }
}

/// A completion pattern must parse and render the date, a 24-hour hour and
/// the seconds
fn check_pattern(pattern: &str) -> SyncResult<()> {
    let mut year = false;
    let mut month = false;
    let mut day = false;
    let mut hour = false;
    let mut second = false;

    for item in StrftimeItems::new(pattern) {
        match item {
            Item::Error => {
                return Err(SyncError::Configuration(format!(
                    "timestamp format '{pattern}' is not a valid strftime pattern"
                )))
            }
            Item::Numeric(Numeric::Year | Numeric::YearMod100, _) => year = true,
            Item::Numeric(Numeric::Month, _)
            | Item::Fixed(Fixed::ShortMonthName | Fixed::LongMonthName) => month = true,
            Item::Numeric(Numeric::Day, _) => day = true,
            Item::Numeric(Numeric::Ordinal, _) => {
                month = true;
                day = true;
            }
            Item::Numeric(Numeric::Hour, _) => hour = true,
            Item::Numeric(Numeric::Second, _) => second = true,
            _ => {}
        }
    }

    let mut missing = Vec::new();
    if !(year && month && day) {
        missing.push("date");
    }
    if !hour {
        missing.push("24-hour hour");
    }
    if !second {
        missing.push("seconds");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Configuration(format!(
            "timestamp format '{pattern}' does not render {}",
            missing.join(", ")
        )))
    }
}

impl Default for CivilTimeFormat {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(system::DEFAULT_UTC_OFFSET_MINUTES * 60)
                .unwrap_or_else(|| Utc.fix()),
            pattern: system::DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 18, 45, 7).unwrap()
    }

    #[test]
    fn test_format_uses_civil_offset_and_24_hour_clock() {
        let format = CivilTimeFormat::default();
        // 18:45:07 UTC is 00:15:07 the next day at UTC+05:30
        assert_eq!(format.format(instant()), "10/03/2024 00:15:07");
    }

    #[test]
    fn test_parse_accepts_own_output_and_rfc3339() {
        let format = CivilTimeFormat::default();
        let rendered = format.format(instant());
        let parsed = format.parse(&rendered).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), instant());

        let rfc = format.parse("2024-03-09T18:45:07Z").unwrap();
        assert_eq!(rfc.with_timezone(&Utc), instant());

        assert!(format.parse("yesterday").is_none());
        assert!(format.parse("   ").is_none());
    }

    #[test]
    fn test_rejects_out_of_range_offset() {
        let err = CivilTimeFormat::new(24 * 60, "%H").unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(CivilTimeFormat::new(0, "  ").is_err());
        let err = CivilTimeFormat::new(i32::MAX, system::DEFAULT_TIMESTAMP_FORMAT).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
    }

    #[test]
    fn test_rejects_unparseable_pattern() {
        let err = CivilTimeFormat::new(330, "%Q").unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.to_string().contains("not a valid strftime pattern"));
        assert!(CivilTimeFormat::new(330, "%d/%m/%Y %H:%M:%").is_err());
    }

    #[test]
    fn test_rejects_pattern_missing_date_hour_or_seconds() {
        for pattern in ["%H:%M:%S", "%d/%m/%Y %H:%M", "%d/%m/%Y %I:%M:%S %p", "%d/%m %H:%M:%S"] {
            let err = CivilTimeFormat::new(330, pattern).unwrap_err();
            assert!(
                err.to_string().contains("does not render"),
                "{pattern} accepted: {err}"
            );
        }
        for pattern in ["%F %T", "%Y-%m-%dT%H:%M:%S%:z", "%d %b %Y %H:%M:%S", "%c"] {
            CivilTimeFormat::new(330, pattern).unwrap();
        }
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(instant());
        clock.advance(chrono::Duration::seconds(30));
        assert_eq!(clock.now(), instant() + chrono::Duration::seconds(30));
        clock.set(instant());
        assert_eq!(clock.now(), instant());
    }
}
