//! Report pipeline
//!
//! Runs one report from billing data to delivered message:
//!
//! 1. fetch grouped costs for the period from the billing source
//! 2. rank them ([`Aggregator`])
//! 3. build chart buckets and the text body from the ranked set
//! 4. render the chart and hand text + image to the delivery channel
//!
//! Any failure aborts the run; there is no partial report and no retry.
//!
//! # Examples
//!
//! ```no_run
//! use costbot::pipeline::ReportPipeline;
//! use costbot_chart::PieChartRenderer;
//! use costbot_core::period::PeriodConfig;
//! use costbot_discord::DiscordWebhookSink;
//! use costbot_provider_aws::CostExplorerSource;
//! use std::sync::Arc;
//!
//! # async fn example() -> costbot::Result<()> {
//! let billing = Arc::new(CostExplorerSource::new("us-east-1").await);
//! let pipeline = ReportPipeline::new("123456789012", billing, Arc::new(PieChartRenderer::new()));
//!
//! let period = PeriodConfig::default().period_at(chrono::Utc::now());
//! let sink = DiscordWebhookSink::new("bot-token", "channel-id");
//! let outcome = pipeline.run(period, &sink).await;
//! sink.wait_for_cleanup().await;
//! println!("posted {:?}", outcome?.receipt.message_id);
//! # Ok(())
//! # }
//! ```

use crate::error::{CostbotError, Result};
use costbot_core::aggregation::Aggregator;
use costbot_core::chart_data::ChartDataBuilder;
use costbot_core::provider::{BillingSource, ChartRenderer, ReportSink};
use costbot_core::report_formatter::{DEFAULT_TITLE, ReportFormatter};
use costbot_core::types::{ChartImage, DateRange, DeliveryReceipt, Report};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a delivered run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: Report,
    pub receipt: DeliveryReceipt,
}

/// Orchestrates a single report run
pub struct ReportPipeline {
    account_id: String,
    billing: Arc<dyn BillingSource>,
    renderer: Arc<dyn ChartRenderer>,
    chart_data: ChartDataBuilder,
    title: String,
    call_timeout: Option<Duration>,
    chart_out: Option<PathBuf>,
}

impl ReportPipeline {
    /// Create a pipeline for `account_id` with the default chart options
    pub fn new(
        account_id: impl Into<String>,
        billing: Arc<dyn BillingSource>,
        renderer: Arc<dyn ChartRenderer>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            billing,
            renderer,
            chart_data: ChartDataBuilder::new(),
            title: DEFAULT_TITLE.to_string(),
            call_timeout: None,
            chart_out: None,
        }
    }

    pub fn with_chart_data(mut self, chart_data: ChartDataBuilder) -> Self {
        self.chart_data = chart_data;
        self
    }

    /// Heading placed above the report body in the delivered message
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Deadline applied separately to the fetch and to the delivery
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Also write every rendered chart to `path`
    pub fn with_chart_output(mut self, path: Option<PathBuf>) -> Self {
        self.chart_out = path;
        self
    }

    /// Fetch, rank, and format the report for `period`
    pub async fn build_report(&self, period: DateRange) -> Result<Report> {
        info!("Building cost report for {}", period);

        let entries = self
            .with_deadline("billing fetch", self.billing.fetch_costs(&period))
            .await?;
        debug!("Billing source returned {} entries", entries.len());

        let records = Aggregator::aggregate(entries);
        if records.total() == 0.0 {
            warn!(
                "Total cost for {} is zero; reporting {} services at 0%",
                period,
                records.len()
            );
        }

        let buckets = self.chart_data.build(&records);
        let content = ReportFormatter::format(&self.account_id, &period, records.total(), &records);

        info!(
            "Report ready: {} services, total ${:.2}, {} chart buckets",
            records.len(),
            records.total(),
            buckets.len()
        );

        Ok(Report::new(
            self.account_id.clone(),
            period,
            records,
            content,
            buckets,
        ))
    }

    /// Render the report's chart, writing it to the chart output path if set
    pub fn render_chart(&self, report: &Report) -> Result<ChartImage> {
        let chart = self.renderer.render(report.buckets())?;
        if let Some(path) = &self.chart_out {
            std::fs::write(path, &chart.bytes)?;
            info!("Wrote chart to {}", path.display());
        }
        Ok(chart)
    }

    /// Full message text: title, blank line, report body
    pub fn message(&self, report: &Report) -> String {
        ReportFormatter::with_title(&self.title, report.content())
    }

    /// Render the chart and post the report through `sink`
    pub async fn deliver(&self, report: &Report, sink: &dyn ReportSink) -> Result<DeliveryReceipt> {
        let chart = self.render_chart(report)?;
        let message = self.message(report);

        let receipt = self
            .with_deadline("delivery", sink.deliver(&message, Some(&chart)))
            .await?;
        info!("Report delivered to channel {}", receipt.channel_id);
        Ok(receipt)
    }

    /// Build and deliver the report for `period`
    pub async fn run(&self, period: DateRange, sink: &dyn ReportSink) -> Result<RunOutcome> {
        let report = self.build_report(period).await?;
        let receipt = self.deliver(&report, sink).await?;
        Ok(RunOutcome { report, receipt })
    }

    async fn with_deadline<T>(
        &self,
        stage: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| CostbotError::Timeout {
                    stage,
                    seconds: limit.as_secs(),
                })?,
            None => call.await,
        }
    }
}
