//! Reporting period selection
//!
//! A report covers the current month up to and including today, where both
//! "month" and "today" are read in a fixed reference timezone rather than
//! the host's local one. The host timezone is never consulted.

use crate::error::{CostbotError, Result};
use crate::types::DateRange;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Reference timezone for report boundaries (UTC+9, no DST)
pub const REPORT_TIMEZONE: Tz = Tz::Asia__Tokyo;

/// Timezone used to derive the reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodConfig {
    /// The timezone in which "today" is evaluated
    pub tz: Tz,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            tz: REPORT_TIMEZONE,
        }
    }
}

impl PeriodConfig {
    /// Create a configuration from an optional IANA name given on the CLI
    pub fn from_cli(timezone_str: Option<&str>) -> Result<Self> {
        match timezone_str {
            Some(tz_str) => {
                let tz = Tz::from_str(tz_str).map_err(|_| {
                    CostbotError::InvalidTimezone(format!(
                        "'{tz_str}'. Use format like 'Asia/Tokyo', 'America/New_York', or 'UTC'"
                    ))
                })?;
                Ok(Self { tz })
            }
            None => Ok(Self::default()),
        }
    }

    /// Month-to-date period for the instant `now`
    pub fn period_at(&self, now: DateTime<Utc>) -> DateRange {
        month_to_date(now, &self.tz)
    }

    pub fn display_name(&self) -> &str {
        self.tz.name()
    }
}

/// `[first of month, today]` with "today" read in `tz`
pub fn month_to_date<T: TimeZone>(now: DateTime<Utc>, tz: &T) -> DateRange {
    let today = now.with_timezone(tz).date_naive();
    debug!("Reference date for {} is {}", now, today);
    month_to_date_for_day(today)
}

/// `[first of month, today]` for a calendar day
pub fn month_to_date_for_day(today: NaiveDate) -> DateRange {
    // Day 1 exists in every month
    let start = today.with_day(1).unwrap_or(today);
    DateRange::ordered(start, today)
}

/// Parse a `YYYY-MM-DD` day given on the command line
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CostbotError::InvalidDate(format!("'{value}'. Expected format YYYY-MM-DD"))
    })
}
