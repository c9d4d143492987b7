//! Discord delivery for costbot
//!
//! This crate implements [`costbot_core::provider::ReportSink`] by posting
//! through a short-lived channel webhook.

pub mod message;
pub mod webhook;

pub use message::fit_message;
pub use webhook::DiscordWebhookSink;
