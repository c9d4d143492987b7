//! In-memory collaborators for pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use costbot_core::error::{CostbotError, DeliveryStage, Result};
use costbot_core::provider::{BillingSource, ChartRenderer, ReportSink};
use costbot_core::types::{ChartBucket, ChartImage, CostEntry, DateRange, DeliveryReceipt};
use std::sync::Mutex;
use std::time::Duration;

/// Billing source returning a fixed list of entries
pub struct StaticBilling {
    entries: Vec<CostEntry>,
    pub periods: Mutex<Vec<DateRange>>,
}

impl StaticBilling {
    pub fn new(pairs: &[(&str, f64)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(service, amount)| CostEntry::new(*service, *amount))
                .collect(),
            periods: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BillingSource for StaticBilling {
    async fn fetch_costs(&self, period: &DateRange) -> Result<Vec<CostEntry>> {
        self.periods.lock().unwrap().push(*period);
        Ok(self.entries.clone())
    }
}

/// Billing source that always fails
pub struct FailingBilling;

#[async_trait]
impl BillingSource for FailingBilling {
    async fn fetch_costs(&self, _period: &DateRange) -> Result<Vec<CostEntry>> {
        Err(CostbotError::DataFetch("AccessDeniedException".into()))
    }
}

/// Billing source that never answers in time
pub struct SlowBilling(pub Duration);

#[async_trait]
impl BillingSource for SlowBilling {
    async fn fetch_costs(&self, _period: &DateRange) -> Result<Vec<CostEntry>> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }
}

/// Renderer that records its input and returns a stub image
#[derive(Default)]
pub struct RecordingRenderer {
    pub seen: Mutex<Vec<Vec<ChartBucket>>>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, buckets: &[ChartBucket]) -> Result<ChartImage> {
        self.seen.lock().unwrap().push(buckets.to_vec());
        Ok(ChartImage {
            file_name: "chart.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        })
    }
}

pub struct FailingRenderer;

impl ChartRenderer for FailingRenderer {
    fn render(&self, _buckets: &[ChartBucket]) -> Result<ChartImage> {
        Err(CostbotError::Render("out of ink".into()))
    }
}

/// One captured delivery
#[derive(Debug, Clone)]
pub struct Delivered {
    pub content: String,
    pub attachment: Option<ChartImage>,
}

/// Sink that keeps everything it is given
#[derive(Default)]
pub struct RecordingSink {
    pub delivered: Mutex<Vec<Delivered>>,
}

#[async_trait]
impl ReportSink for RecordingSink {
    async fn deliver(
        &self,
        content: &str,
        attachment: Option<&ChartImage>,
    ) -> Result<DeliveryReceipt> {
        self.delivered.lock().unwrap().push(Delivered {
            content: content.to_string(),
            attachment: attachment.cloned(),
        });
        Ok(DeliveryReceipt {
            message_id: Some("m1".into()),
            channel_id: "test-channel".into(),
        })
    }
}

pub struct FailingSink;

#[async_trait]
impl ReportSink for FailingSink {
    async fn deliver(
        &self,
        _content: &str,
        _attachment: Option<&ChartImage>,
    ) -> Result<DeliveryReceipt> {
        Err(CostbotError::delivery(DeliveryStage::Execute, "HTTP 403"))
    }
}

/// Delivery channel that never answers in time
pub struct SlowSink(pub Duration);

#[async_trait]
impl ReportSink for SlowSink {
    async fn deliver(
        &self,
        _content: &str,
        _attachment: Option<&ChartImage>,
    ) -> Result<DeliveryReceipt> {
        tokio::time::sleep(self.0).await;
        Ok(DeliveryReceipt {
            message_id: None,
            channel_id: "test-channel".into(),
        })
    }
}
