//! Dry-run output
//!
//! Renders a finished report for the terminal instead of posting it, either
//! as the exact message text that would be delivered or as JSON.

use crate::error::Result;
use costbot_core::types::{ChartBucket, CostRecordSet, DateRange, Report};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    account: &'a str,
    period: DateRange,
    total: f64,
    records: &'a CostRecordSet,
    buckets: &'a [ChartBucket],
    message: &'a str,
}

/// Text as it would appear in the channel, followed by the chart buckets
pub fn format_text(report: &Report, message: &str) -> String {
    let mut out = String::from(message);
    out.push_str("\nChart:\n");
    for bucket in report.buckets() {
        out.push_str(&format!("  {}: ${:.2}\n", bucket.label(), bucket.value()));
    }
    out
}

/// Pretty-printed JSON with records, buckets, and the message text
pub fn format_json(report: &Report, message: &str) -> Result<String> {
    let json = JsonReport {
        account: report.account(),
        period: report.period(),
        total: report.records().total(),
        records: report.records(),
        buckets: report.buckets(),
        message,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
