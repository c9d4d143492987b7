//! costbot - Post a month-to-date AWS cost breakdown to Discord

use clap::Parser;
use costbot::{
    ReportConfig, ReportPipeline,
    cli::Cli,
    error::Result,
    output::{format_json, format_text},
};
use costbot_chart::PieChartRenderer;
use costbot_discord::DiscordWebhookSink;
use costbot_provider_aws::CostExplorerSource;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so its values back the env-aware flags
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging. The --quiet flag should override RUST_LOG.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("costbot=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    let config = ReportConfig::from_cli(&cli)?;
    debug!("Using {:?}", config);

    // Fail on missing credentials before spending a Cost Explorer call
    let target = if cli.dry_run {
        None
    } else {
        Some(config.delivery_target()?)
    };

    let period = cli.resolve_period(chrono::Utc::now())?;
    let billing = Arc::new(CostExplorerSource::new(cli.region.clone()).await);
    let pipeline = ReportPipeline::new(
        config.account_id.clone(),
        billing,
        Arc::new(PieChartRenderer::new()),
    )
    .with_chart_data(cli.chart_data_builder()?)
    .with_title(cli.title.clone())
    .with_timeout(cli.call_timeout())
    .with_chart_output(cli.chart_out.clone());

    let Some(target) = target else {
        info!("Dry run: the report will not be posted");
        let report = pipeline.build_report(period).await?;
        if cli.chart_out.is_some() {
            pipeline.render_chart(&report)?;
        }
        let message = pipeline.message(&report);
        let rendered = if cli.json {
            format_json(&report, &message)?
        } else {
            format_text(&report, &message)
        };
        println!("{rendered}");
        return Ok(());
    };

    let sink = DiscordWebhookSink::new(target.bot_token, target.channel_id)
        .with_request_timeout(cli.call_timeout());
    let outcome = pipeline.run(period, &sink).await;
    // A delivery deadline abandons the round trip but not the webhook cleanup
    sink.wait_for_cleanup().await;
    let outcome = outcome?;

    info!(
        "Posted report for {} ({} services, total ${:.2})",
        outcome.report.period(),
        outcome.report.records().len(),
        outcome.report.records().total()
    );

    Ok(())
}
