//! Chart rendering for costbot
//!
//! This crate implements [`costbot_core::provider::ChartRenderer`] as a
//! PNG pie chart.

pub mod pie;

pub use pie::PieChartRenderer;
