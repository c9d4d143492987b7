//! Integration tests for the report pipeline

mod common;

use chrono::NaiveDate;
use common::{
    FailingBilling, FailingRenderer, FailingSink, RecordingRenderer, RecordingSink, SlowBilling,
    SlowSink, StaticBilling,
};
use costbot::{CostbotError, ReportPipeline};
use costbot_chart::PieChartRenderer;
use costbot_core::chart_data::ChartDataBuilder;
use costbot_core::types::{ChartBucket, DateRange};
use costbot_discord::DiscordWebhookSink;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn may_period() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_build_report() {
    let billing = Arc::new(StaticBilling::new(&[
        ("S3", 80.0),
        ("EC2", 120.0),
    ]));
    let pipeline = ReportPipeline::new(
        "1234",
        billing.clone(),
        Arc::new(RecordingRenderer::default()),
    );

    let report = pipeline.build_report(may_period()).await.unwrap();

    assert_eq!(billing.periods.lock().unwrap().as_slice(), &[may_period()]);
    assert_eq!(report.account(), "1234");
    assert_eq!(report.period(), may_period());
    assert_eq!(report.records().total(), 200.0);
    assert_eq!(
        report.content(),
        "AWS Account: 1234\n\
         TimePeriod: 2024-05-01 - 2024-05-15\n\
         Total: $200.00\n\
         \n\
         - EC2: $120.00 (60.0%)\n\
         - S3: $80.00 (40.0%)\n"
    );

    let labels: Vec<_> = report.buckets().iter().map(ChartBucket::label).collect();
    assert_eq!(labels, vec!["EC2", "S3", "Others"]);
}

#[tokio::test]
async fn test_run_delivers_titled_message_with_chart() {
    let renderer = Arc::new(RecordingRenderer::default());
    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[("EC2", 990.0), ("KMS", 10.0)])),
        renderer.clone(),
    );
    let sink = RecordingSink::default();

    let outcome = pipeline.run(may_period(), &sink).await.unwrap();
    assert_eq!(outcome.receipt.message_id.as_deref(), Some("m1"));

    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].content.starts_with("__Daily Report__\n\nAWS Account: 1234\n"));
    assert!(delivered[0].content.contains("- KMS: $10.00 (1.0%)\n"));
    assert_eq!(delivered[0].attachment.as_ref().unwrap().bytes, vec![1, 2, 3]);

    let seen = renderer.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], outcome.report.buckets());
}

#[tokio::test]
async fn test_custom_title_and_threshold() {
    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[("EC2", 97.0), ("S3", 3.0)])),
        Arc::new(RecordingRenderer::default()),
    )
    .with_title("Monthly spend")
    .with_chart_data(ChartDataBuilder::new().with_threshold(5.0));
    let sink = RecordingSink::default();

    let outcome = pipeline.run(may_period(), &sink).await.unwrap();

    assert_eq!(
        outcome.report.buckets(),
        &[
            ChartBucket::Service {
                label: costbot_core::ServiceName::new("EC2"),
                value: 97.0
            },
            ChartBucket::Others { value: 3.0 },
        ]
    );
    let delivered = sink.delivered.lock().unwrap();
    assert!(delivered[0].content.starts_with("Monthly spend\n\n"));
}

#[tokio::test]
async fn test_empty_billing_is_a_valid_report() {
    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[])),
        Arc::new(PieChartRenderer::new()),
    );
    let sink = RecordingSink::default();

    let outcome = pipeline.run(may_period(), &sink).await.unwrap();

    assert!(outcome.report.records().is_empty());
    assert!(outcome.report.content().contains("Total: $0.00\n"));
    assert!(
        !outcome
            .report
            .content()
            .lines()
            .any(|line| line.starts_with("- "))
    );
    assert_eq!(outcome.report.buckets(), &[ChartBucket::Others { value: 0.0 }]);

    let delivered = sink.delivered.lock().unwrap();
    let png = &delivered[0].attachment.as_ref().unwrap().bytes;
    assert_eq!(&png[..4], b"\x89PNG");
}

#[tokio::test]
async fn test_all_zero_costs() {
    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[("Tax", 0.0), ("S3", 0.0)])),
        Arc::new(RecordingRenderer::default()),
    );

    let report = pipeline.build_report(may_period()).await.unwrap();
    assert!(report.content().contains("- Tax: $0.00 (0.0%)\n"));
    assert!(report.content().contains("- S3: $0.00 (0.0%)\n"));
}

#[tokio::test]
async fn test_fetch_failure_aborts_before_delivery() {
    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(FailingBilling),
        Arc::new(RecordingRenderer::default()),
    );
    let sink = RecordingSink::default();

    let err = pipeline.run(may_period(), &sink).await.unwrap_err();
    assert!(matches!(err, CostbotError::DataFetch(_)));
    assert!(sink.delivered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_render_failure_aborts_before_delivery() {
    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[("EC2", 1.0)])),
        Arc::new(FailingRenderer),
    );
    let sink = RecordingSink::default();

    let err = pipeline.run(may_period(), &sink).await.unwrap_err();
    assert!(matches!(err, CostbotError::Render(_)));
    assert!(sink.delivered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_failure_is_surfaced() {
    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[("EC2", 1.0)])),
        Arc::new(RecordingRenderer::default()),
    );

    let err = pipeline.run(may_period(), &FailingSink).await.unwrap_err();
    assert!(matches!(err, CostbotError::Delivery { .. }));
}

#[tokio::test]
async fn test_fetch_deadline() {
    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(SlowBilling(Duration::from_secs(5))),
        Arc::new(RecordingRenderer::default()),
    )
    .with_timeout(Some(Duration::from_millis(20)));

    let err = pipeline.build_report(may_period()).await.unwrap_err();
    assert!(matches!(
        err,
        CostbotError::Timeout {
            stage: "billing fetch",
            ..
        }
    ));
}

#[tokio::test]
async fn test_delivery_deadline() {
    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[("EC2", 1.0)])),
        Arc::new(RecordingRenderer::default()),
    )
    .with_timeout(Some(Duration::from_millis(20)));

    let err = pipeline
        .run(may_period(), &SlowSink(Duration::from_secs(5)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CostbotError::Timeout {
            stage: "delivery",
            ..
        }
    ));
}

#[tokio::test]
async fn test_delivery_deadline_still_removes_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/chan1/webhooks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "wh1", "token": "secret"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhooks/wh1/secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "msg1"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/webhooks/wh1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[("EC2", 1.0)])),
        Arc::new(RecordingRenderer::default()),
    )
    .with_timeout(Some(Duration::from_millis(300)));
    let sink = DiscordWebhookSink::new("bot-token", "chan1").with_api_base(server.uri());

    let err = pipeline.run(may_period(), &sink).await.unwrap_err();
    assert!(matches!(
        err,
        CostbotError::Timeout {
            stage: "delivery",
            ..
        }
    ));

    sink.wait_for_cleanup().await;
    server.verify().await;
}

#[tokio::test]
async fn test_chart_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.png");

    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[("EC2", 120.0), ("S3", 80.0)])),
        Arc::new(PieChartRenderer::new()),
    )
    .with_chart_output(Some(path.clone()));

    let report = pipeline.build_report(may_period()).await.unwrap();
    let chart = pipeline.render_chart(&report).unwrap();

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, chart.bytes);
}

#[tokio::test]
async fn test_chart_output_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("chart.png");

    let pipeline = ReportPipeline::new(
        "1234",
        Arc::new(StaticBilling::new(&[("EC2", 1.0)])),
        Arc::new(RecordingRenderer::default()),
    )
    .with_chart_output(Some(path));
    let sink = RecordingSink::default();

    let err = pipeline.run(may_period(), &sink).await.unwrap_err();
    assert!(matches!(err, CostbotError::Io(_)));
    assert!(sink.delivered.lock().unwrap().is_empty());
}
