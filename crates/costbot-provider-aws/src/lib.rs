//! AWS billing source for costbot
//!
//! This crate implements [`costbot_core::provider::BillingSource`] on top of
//! the Cost Explorer `GetCostAndUsage` API.

pub mod cost_explorer;

pub use cost_explorer::CostExplorerSource;
