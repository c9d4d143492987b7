//! CLI interface for costbot
//!
//! Every credential flag falls back to an environment variable, so a
//! scheduled job can run the binary with no arguments once `AWS_ACCOUNT`,
//! `BOT_TOKEN`, and `CHANNEL_ID` are set (directly or through a `.env` file).
//!
//! # Example
//!
//! ```bash
//! # Post the month-to-date report
//! costbot
//!
//! # Preview a report for a fixed day without posting it
//! costbot --dry-run --date 2024-05-17 --chart-out chart.png
//! ```

use crate::error::{CostbotError, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use costbot_core::chart_data::{ChartDataBuilder, DEFAULT_OTHERS_THRESHOLD};
use costbot_core::period::{PeriodConfig, month_to_date_for_day, parse_day};
use costbot_core::report_formatter::DEFAULT_TITLE;
use costbot_core::types::DateRange;
use costbot_provider_aws::cost_explorer::DEFAULT_REGION;
use std::path::PathBuf;
use std::time::Duration;

/// Post a month-to-date AWS cost breakdown to Discord
#[derive(Parser, Debug, Clone)]
#[command(name = "costbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// AWS account identifier shown in the report
    #[arg(long, env = "AWS_ACCOUNT")]
    pub account: Option<String>,

    /// Discord bot token used to manage the channel webhook
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Discord channel to post into
    #[arg(long, env = "CHANNEL_ID")]
    pub channel_id: Option<String>,

    /// Timezone in which "today" is evaluated (default: Asia/Tokyo)
    #[arg(long, short = 'z')]
    pub timezone: Option<String>,

    /// Report as if today were this day (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Share in percent below which services are grouped as "Others"
    #[arg(long, default_value_t = DEFAULT_OTHERS_THRESHOLD)]
    pub threshold: f64,

    /// Leave "Others" out of the chart when it is empty
    #[arg(long)]
    pub omit_empty_others: bool,

    /// Heading placed above the report
    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// AWS region for the Cost Explorer endpoint
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Deadline in seconds for each external call (0 disables it)
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Print the report instead of posting it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the dry-run report as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Also write the chart PNG to this path
    #[arg(long)]
    pub chart_out: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Reporting period: pinned by `--date`, otherwise derived from `now`
    pub fn resolve_period(&self, now: DateTime<Utc>) -> Result<DateRange> {
        if let Some(date_str) = &self.date {
            return Ok(month_to_date_for_day(parse_day(date_str)?));
        }
        let period_config = PeriodConfig::from_cli(self.timezone.as_deref())?;
        Ok(period_config.period_at(now))
    }

    /// Chart bucketing options
    pub fn chart_data_builder(&self) -> Result<ChartDataBuilder> {
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(CostbotError::Config(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }
        Ok(ChartDataBuilder::new()
            .with_threshold(self.threshold)
            .with_omit_empty_others(self.omit_empty_others))
    }

    /// Per-call deadline, `None` when disabled
    pub fn call_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}
