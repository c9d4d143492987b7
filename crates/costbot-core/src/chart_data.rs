//! Chart input construction
//!
//! Records whose share of the total reaches the threshold get a wedge of
//! their own; everything smaller is summed into a single "Others" wedge
//! placed last.

use crate::types::{ChartBucket, CostRecordSet};
use tracing::debug;

/// Share (in percent) below which a service is folded into "Others"
pub const DEFAULT_OTHERS_THRESHOLD: f64 = 1.0;

/// Converts a ranked record set into chart buckets
///
/// # Examples
///
/// ```
/// use costbot_core::aggregation::Aggregator;
/// use costbot_core::chart_data::ChartDataBuilder;
/// use costbot_core::types::CostEntry;
///
/// let records = Aggregator::aggregate(vec![
///     CostEntry::new("EC2", 995.0),
///     CostEntry::new("KMS", 5.0),
/// ]);
/// let buckets = ChartDataBuilder::new().build(&records);
///
/// assert_eq!(buckets.len(), 2);
/// assert_eq!(buckets[0].label(), "EC2");
/// assert_eq!(buckets[1].label(), "Others");
/// assert_eq!(buckets[1].value(), 5.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChartDataBuilder {
    threshold: f64,
    omit_empty_others: bool,
}

impl Default for ChartDataBuilder {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_OTHERS_THRESHOLD,
            omit_empty_others: false,
        }
    }
}

impl ChartDataBuilder {
    /// Builder with the default 1% threshold that always emits "Others"
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the share threshold in percent
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Drop the "Others" bucket when nothing was folded into it
    pub fn with_omit_empty_others(mut self, omit: bool) -> Self {
        self.omit_empty_others = omit;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Partition records into named buckets followed by "Others"
    pub fn build(&self, records: &CostRecordSet) -> Vec<ChartBucket> {
        let mut buckets = Vec::with_capacity(records.len() + 1);
        let mut others = 0.0;
        let mut folded = 0usize;

        for record in records {
            if record.ratio < self.threshold {
                others += record.cost;
                folded += 1;
                continue;
            }
            buckets.push(ChartBucket::Service {
                label: record.name.clone(),
                value: record.cost,
            });
        }

        debug!(
            "Folded {} of {} services into Others (${:.2})",
            folded,
            records.len(),
            others
        );

        if !(self.omit_empty_others && others == 0.0) {
            buckets.push(ChartBucket::Others { value: others });
        }

        buckets
    }
}
