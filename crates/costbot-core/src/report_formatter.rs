//! Plain-text rendering of a ranked cost report
//!
//! The output is locale-independent: costs always carry two decimals and
//! shares one decimal.
//!
//! ```text
//! AWS Account: 123456789012
//! TimePeriod: 2024-05-01 - 2024-05-15
//! Total: $200.00
//!
//! - EC2: $120.00 (60.0%)
//! - S3: $80.00 (40.0%)
//! ```

use crate::types::{CostRecordSet, DateRange};

/// Default heading placed above the report body in delivered messages
pub const DEFAULT_TITLE: &str = "__Daily Report__";

/// Builds the text body of a report
pub struct ReportFormatter;

impl ReportFormatter {
    /// Header, total, and one line per record in ranked order
    ///
    /// An empty record set yields the header and total only.
    pub fn format(account: &str, period: &DateRange, total: f64, records: &CostRecordSet) -> String {
        let mut out = format!(
            "AWS Account: {account}\nTimePeriod: {period}\nTotal: ${total:.2}\n\n"
        );

        for record in records {
            out.push_str(&format!(
                "- {}: ${:.2} ({:.1}%)\n",
                record.name, record.cost, record.ratio
            ));
        }

        out
    }

    /// Prefix a report body with a heading line
    pub fn with_title(title: &str, content: &str) -> String {
        if title.is_empty() {
            return content.to_string();
        }
        format!("{title}\n\n{content}")
    }
}
