//! Core types, aggregation, and formatting for costbot
//!
//! This crate holds everything about a cost report that does not touch
//! the network: the data model, ranking and share computation, chart
//! bucketing, text formatting, reporting-period selection, and the traits
//! the I/O crates implement.

pub mod aggregation;
pub mod chart_data;
pub mod error;
pub mod period;
pub mod provider;
pub mod report_formatter;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{CostbotError, DeliveryStage, Result};
pub use types::{
    ChartBucket, ChartImage, CostEntry, CostRecordSet, DateRange, DeliveryReceipt, Record, Report,
    ServiceName,
};
