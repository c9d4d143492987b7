//! Collaborator traits for a report run
//!
//! The pipeline talks to the outside world only through these three seams:
//! where costs come from, how the chart becomes an image, and where the
//! finished message goes. Each backend crate implements one of them.

use crate::error::Result;
use crate::types::{ChartBucket, ChartImage, CostEntry, DateRange, DeliveryReceipt};
use async_trait::async_trait;

/// Source of per-service costs for a period.
///
/// Implementations return one entry per service, already grouped by the
/// billing backend, with non-negative amounts.
#[async_trait]
pub trait BillingSource: Send + Sync {
    /// Fetch grouped costs for the inclusive `period`.
    async fn fetch_costs(&self, period: &DateRange) -> Result<Vec<CostEntry>>;
}

/// Turns chart buckets into an image attachment.
pub trait ChartRenderer: Send + Sync {
    /// Render `buckets` in order. An all-zero input must still render.
    fn render(&self, buckets: &[ChartBucket]) -> Result<ChartImage>;
}

/// Delivers one message, optionally with an attachment.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Post `content` with `attachment`. No retries.
    async fn deliver(&self, content: &str, attachment: Option<&ChartImage>)
    -> Result<DeliveryReceipt>;
}
