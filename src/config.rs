//! Run configuration
//!
//! Credentials and identifiers are resolved once at startup and passed
//! into the pipeline explicitly; nothing below `main` reads the environment.

use crate::cli::Cli;
use crate::error::{CostbotError, Result};
use std::fmt;

/// Account and delivery settings for one run
#[derive(Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// AWS account identifier shown in the report header
    pub account_id: String,
    /// Discord bot token
    pub bot_token: Option<String>,
    /// Discord channel to post into
    pub channel_id: Option<String>,
}

/// Credentials required to post a report
#[derive(Clone, PartialEq, Eq)]
pub struct DeliveryTarget<'a> {
    pub bot_token: &'a str,
    pub channel_id: &'a str,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ReportConfig {
    /// Collect settings from parsed CLI arguments
    ///
    /// The account id is always required. Delivery credentials are checked
    /// separately by [`ReportConfig::delivery_target`] so a dry run works
    /// without them.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let account_id = non_empty(cli.account.as_deref()).ok_or_else(|| {
            CostbotError::Config("AWS account id is required (--account or AWS_ACCOUNT)".into())
        })?;

        Ok(Self {
            account_id,
            bot_token: non_empty(cli.bot_token.as_deref()),
            channel_id: non_empty(cli.channel_id.as_deref()),
        })
    }

    /// Bot token and channel, or a configuration error naming what is missing
    pub fn delivery_target(&self) -> Result<DeliveryTarget<'_>> {
        match (self.bot_token.as_deref(), self.channel_id.as_deref()) {
            (Some(bot_token), Some(channel_id)) => Ok(DeliveryTarget {
                bot_token,
                channel_id,
            }),
            (None, _) => Err(CostbotError::Config(
                "Discord bot token is required (--bot-token or BOT_TOKEN)".into(),
            )),
            (_, None) => Err(CostbotError::Config(
                "Discord channel id is required (--channel-id or CHANNEL_ID)".into(),
            )),
        }
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("account_id", &self.account_id)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

impl fmt::Debug for DeliveryTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryTarget")
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}
