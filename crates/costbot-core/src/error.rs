//! Failure modes of a report run
//!
//! Each variant names the stage that failed: fetching billing data,
//! rendering the chart, or one of the three webhook requests. Nothing
//! retries; the binary prints the error and exits non-zero.
//!
//! # Example
//!
//! ```
//! use costbot_core::error::{CostbotError, DeliveryStage};
//!
//! let err = CostbotError::delivery(DeliveryStage::Execute, "HTTP 403 Forbidden");
//! assert_eq!(
//!     err.to_string(),
//!     "Delivery failed during execute webhook: HTTP 403 Forbidden"
//! );
//! ```

use std::fmt;
use thiserror::Error;

/// Step of the Discord webhook round trip that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStage {
    /// Creating the temporary channel webhook
    CreateWebhook,
    /// Posting the message through the webhook
    Execute,
    /// Removing the temporary webhook
    DeleteWebhook,
}

impl fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateWebhook => write!(f, "create webhook"),
            Self::Execute => write!(f, "execute webhook"),
            Self::DeleteWebhook => write!(f, "delete webhook"),
        }
    }
}

/// Main error type for costbot operations
///
/// Every stage of a report run maps its failures onto one of these
/// variants. A run never recovers from any of them.
#[derive(Error, Debug)]
pub enum CostbotError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Billing data could not be retrieved or understood
    #[error("Failed to fetch billing data: {0}")]
    DataFetch(String),

    /// Chart image could not be produced
    #[error("Failed to render chart: {0}")]
    Render(String),

    /// Message could not be delivered
    #[error("Delivery failed during {stage}: {message}")]
    Delivery {
        /// The step that failed
        stage: DeliveryStage,
        /// The error message
        message: String,
    },

    /// An external call ran past its deadline
    #[error("{stage} timed out after {seconds}s")]
    Timeout {
        /// The pipeline stage that timed out
        stage: &'static str,
        /// The deadline that was exceeded
        seconds: u64,
    },

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Reporting period whose start is after its end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange {
        /// First day of the range
        start: chrono::NaiveDate,
        /// Last day of the range
        end: chrono::NaiveDate,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CostbotError {
    /// Shorthand for a delivery failure at `stage`
    pub fn delivery(stage: DeliveryStage, message: impl Into<String>) -> Self {
        Self::Delivery {
            stage,
            message: message.into(),
        }
    }
}

/// Result of any costbot operation
///
/// # Example
///
/// ```
/// use costbot_core::{CostbotError, Result};
///
/// fn parse_threshold(value: &str) -> Result<f64> {
///     value
///         .parse()
///         .map_err(|_| CostbotError::Config(format!("invalid threshold '{value}'")))
/// }
///
/// assert_eq!(parse_threshold("2.5").unwrap(), 2.5);
/// assert!(parse_threshold("two").is_err());
/// ```
pub type Result<T> = std::result::Result<T, CostbotError>;
