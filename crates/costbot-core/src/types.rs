//! Report data model
//!
//! The types here form the data model shared by every stage of a report run:
//! raw billing entries, ranked records, chart buckets, the reporting period,
//! and the finished report.

use crate::error::{CostbotError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the synthetic low-share chart bucket
pub const OTHERS_LABEL: &str = "Others";

/// Strongly-typed service name wrapper
///
/// # Examples
/// ```
/// use costbot_core::types::ServiceName;
///
/// let service = ServiceName::new("Amazon Simple Storage Service");
/// assert_eq!(service.as_str(), "Amazon Simple Storage Service");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    /// Create a new ServiceName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One service's spend for the period, as reported by the billing source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    /// Service the cost belongs to
    pub service: ServiceName,
    /// Non-negative amount in the account's billing currency
    pub amount: f64,
}

impl CostEntry {
    /// Create a new CostEntry
    pub fn new(service: impl Into<String>, amount: f64) -> Self {
        Self {
            service: ServiceName::new(service),
            amount,
        }
    }
}

/// A ranked service with its share of the period total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Service identifier
    pub name: ServiceName,
    /// Spend for the period
    pub cost: f64,
    /// Percentage of the period total, `0.0` when the total is zero
    pub ratio: f64,
}

/// Records for one reporting period, ordered by descending cost
///
/// Only [`crate::aggregation::Aggregator`] builds non-empty sets, so the
/// ordering and the ratio sum hold for every instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRecordSet {
    total: f64,
    records: Vec<Record>,
}

impl CostRecordSet {
    pub(crate) fn new(total: f64, records: Vec<Record>) -> Self {
        Self { total, records }
    }

    /// Sum of every record's cost
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Records in ranked order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a CostRecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A (label, value) pair handed to the chart renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartBucket {
    /// A service large enough to get its own wedge
    Service { label: ServiceName, value: f64 },
    /// Sum of every service below the share threshold
    Others { value: f64 },
}

impl ChartBucket {
    /// Text shown next to the wedge
    pub fn label(&self) -> &str {
        match self {
            Self::Service { label, .. } => label.as_str(),
            Self::Others { .. } => OTHERS_LABEL,
        }
    }

    /// Size of the wedge
    pub fn value(&self) -> f64 {
        match self {
            Self::Service { value, .. } | Self::Others { value } => *value,
        }
    }

    pub fn is_others(&self) -> bool {
        matches!(self, Self::Others { .. })
    }
}

/// Inclusive calendar date range a report covers
///
/// # Examples
/// ```
/// use costbot_core::types::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
/// ).unwrap();
/// assert_eq!(range.to_string(), "2024-05-01 - 2024-05-15");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting a start that falls after the end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CostbotError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Caller guarantees `start <= end`
    pub(crate) fn ordered(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// First day of the range
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Day after the last day, for APIs that take half-open intervals
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Finished report for one (account, period) pair
///
/// Built once per run and handed to the renderer and the delivery channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    account: String,
    period: DateRange,
    records: CostRecordSet,
    content: String,
    buckets: Vec<ChartBucket>,
}

impl Report {
    pub fn new(
        account: impl Into<String>,
        period: DateRange,
        records: CostRecordSet,
        content: String,
        buckets: Vec<ChartBucket>,
    ) -> Self {
        Self {
            account: account.into(),
            period,
            records,
            content,
            buckets,
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn period(&self) -> DateRange {
        self.period
    }

    /// Ranked records the report was built from
    pub fn records(&self) -> &CostRecordSet {
        &self.records
    }

    /// Formatted text body
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Chart input
    pub fn buckets(&self) -> &[ChartBucket] {
        &self.buckets
    }
}

/// Encoded chart ready to attach to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Acknowledgement returned by a delivery channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Identifier of the posted message, if the channel reports one
    pub message_id: Option<String>,
    /// Where the message went
    pub channel_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let result = DateRange::new(date(2024, 5, 10), date(2024, 5, 1));
        assert!(matches!(result, Err(CostbotError::InvalidRange { .. })));
    }

    #[test]
    fn test_date_range_single_day() {
        let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 1)).unwrap();
        assert_eq!(range.to_string(), "2024-05-01 - 2024-05-01");
        assert_eq!(range.end_exclusive(), date(2024, 5, 2));
    }

    #[test]
    fn test_end_exclusive_rolls_over_month() {
        let range = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        assert_eq!(range.end_exclusive(), date(2024, 3, 1));
    }

    #[test]
    fn test_bucket_labels() {
        let service = ChartBucket::Service {
            label: ServiceName::new("AWS Lambda"),
            value: 3.5,
        };
        let others = ChartBucket::Others { value: 0.25 };
        assert_eq!(service.label(), "AWS Lambda");
        assert_eq!(others.label(), OTHERS_LABEL);
        assert_eq!(others.value(), 0.25);
        assert!(others.is_others());
        assert!(!service.is_others());
    }

    #[test]
    fn test_bucket_serializes_with_kind_tag() {
        let bucket = ChartBucket::Others { value: 1.0 };
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["kind"], "others");
        assert_eq!(json["value"], 1.0);
    }
}
