//! Aggregation of raw billing entries into a ranked record set
//!
//! The billing source already groups spend by service, so aggregation here
//! means totalling, computing each service's share, and ranking. Entries are
//! never merged: two entries with the same service name become two records.
//!
//! # Examples
//!
//! ```
//! use costbot_core::aggregation::Aggregator;
//! use costbot_core::types::CostEntry;
//!
//! let records = Aggregator::aggregate(vec![
//!     CostEntry::new("Amazon Simple Storage Service", 80.0),
//!     CostEntry::new("Amazon Elastic Compute Cloud - Compute", 120.0),
//! ]);
//!
//! assert_eq!(records.total(), 200.0);
//! assert_eq!(records.records()[0].name.as_str(), "Amazon Elastic Compute Cloud - Compute");
//! assert_eq!(records.records()[0].ratio, 60.0);
//! ```

use crate::types::{CostEntry, CostRecordSet, Record};

/// Turns billing entries into a [`CostRecordSet`]
pub struct Aggregator;

impl Aggregator {
    /// Sum of all entry amounts, `0.0` for no entries
    pub fn total_cost(entries: &[CostEntry]) -> f64 {
        entries.iter().map(|entry| entry.amount).sum()
    }

    /// Rank entries by descending cost and annotate each with its share
    ///
    /// Equal costs keep their input order. When the total is zero every
    /// ratio is `0.0`; the result is still a valid, empty-valued report.
    pub fn aggregate(entries: impl IntoIterator<Item = CostEntry>) -> CostRecordSet {
        let entries: Vec<CostEntry> = entries.into_iter().collect();
        let total = Self::total_cost(&entries);

        let mut records: Vec<Record> = entries
            .into_iter()
            .map(|entry| Record {
                ratio: Self::ratio(entry.amount, total),
                cost: entry.amount,
                name: entry.service,
            })
            .collect();

        // sort_by is stable, so ties stay in input order
        records.sort_by(|a, b| b.cost.total_cmp(&a.cost));

        CostRecordSet::new(total, records)
    }

    fn ratio(cost: f64, total: f64) -> f64 {
        if total > 0.0 {
            cost / total * 100.0
        } else {
            0.0
        }
    }
}
