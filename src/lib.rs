//! costbot - Post a month-to-date AWS cost breakdown to Discord
//!
//! A run does four things:
//! - Fetch per-service blended cost from AWS Cost Explorer
//! - Rank services by spend and compute each one's share
//! - Render a pie chart with small services grouped as "Others"
//! - Deliver the text report and chart through a Discord webhook
//!
//! The building blocks live in the workspace crates; this crate wires them
//! together behind the CLI.

pub mod cli;
pub mod config;
pub mod output;
pub mod pipeline;

#[cfg(test)]
pub mod test_utils;

pub use costbot_core::error;

// Re-export commonly used types
pub use config::ReportConfig;
pub use costbot_core::error::{CostbotError, Result};
pub use pipeline::{ReportPipeline, RunOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
