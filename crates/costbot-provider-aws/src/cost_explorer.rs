//! Cost Explorer client
//!
//! Queries month-granularity blended cost grouped by the `SERVICE`
//! dimension. Cost Explorer treats the end date as exclusive, so the
//! inclusive reporting period is widened by one day on the way out.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_costexplorer::{
    Client,
    error::DisplayErrorContext,
    types::{DateInterval, Granularity, GroupDefinition, GroupDefinitionType, ResultByTime},
};
use costbot_core::error::{CostbotError, Result};
use costbot_core::provider::BillingSource;
use costbot_core::types::{CostEntry, DateRange};
use tracing::{debug, info};

/// Region hosting the Cost Explorer endpoint
pub const DEFAULT_REGION: &str = "us-east-1";

/// Cost metric reported per service
pub const BLENDED_COST: &str = "BlendedCost";

const SERVICE_DIMENSION: &str = "SERVICE";

/// Billing source backed by AWS Cost Explorer
pub struct CostExplorerSource {
    client: Client,
    metric: String,
}

impl CostExplorerSource {
    /// Create a source using the default credential chain in `region`
    pub async fn new(region: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .load()
            .await;
        Self::from_client(Client::new(&config))
    }

    /// Wrap an existing client
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            metric: BLENDED_COST.to_string(),
        }
    }

    /// Report a different Cost Explorer metric, e.g. `UnblendedCost`
    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = metric.into();
        self
    }
}

#[async_trait]
impl BillingSource for CostExplorerSource {
    async fn fetch_costs(&self, period: &DateRange) -> Result<Vec<CostEntry>> {
        let start = period.start().format("%Y-%m-%d").to_string();
        let end = period.end_exclusive().format("%Y-%m-%d").to_string();
        info!("Fetching {} from Cost Explorer for {}", self.metric, period);

        let interval = DateInterval::builder()
            .start(start)
            .end(end)
            .build()
            .map_err(|e| CostbotError::DataFetch(format!("invalid date interval: {e}")))?;

        let mut entries = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut page = 0usize;

        loop {
            page += 1;
            let response = self
                .client
                .get_cost_and_usage()
                .time_period(interval.clone())
                .granularity(Granularity::Monthly)
                .metrics(&self.metric)
                .group_by(
                    GroupDefinition::builder()
                        .r#type(GroupDefinitionType::Dimension)
                        .key(SERVICE_DIMENSION)
                        .build(),
                )
                .set_next_page_token(next_page_token.take())
                .send()
                .await
                .map_err(|e| CostbotError::DataFetch(DisplayErrorContext(&e).to_string()))?;

            let page_entries = entries_from_results(response.results_by_time(), &self.metric)?;
            debug!("Page {} returned {} service groups", page, page_entries.len());
            entries.extend(page_entries);

            match response.next_page_token() {
                Some(token) if !token.is_empty() => next_page_token = Some(token.to_string()),
                _ => break,
            }
        }

        info!("Fetched costs for {} services", entries.len());
        Ok(entries)
    }
}

/// Flatten the grouped results of one response page into cost entries
///
/// Groups keep response order. A group without a service key, without the
/// requested metric, or with an amount that is not a finite number fails
/// the whole fetch. Negative amounts (credits, refunds) are clamped to zero.
pub fn entries_from_results(results: &[ResultByTime], metric: &str) -> Result<Vec<CostEntry>> {
    let mut entries = Vec::new();

    for result in results {
        for group in result.groups() {
            let service = group
                .keys()
                .first()
                .ok_or_else(|| CostbotError::DataFetch("group without a service key".into()))?;

            let amount = group
                .metrics()
                .and_then(|metrics| metrics.get(metric))
                .and_then(|value| value.amount())
                .ok_or_else(|| {
                    CostbotError::DataFetch(format!("no {metric} amount for service '{service}'"))
                })?;

            let amount: f64 = amount
                .trim()
                .parse()
                .ok()
                .filter(|value: &f64| value.is_finite())
                .ok_or_else(|| {
                    CostbotError::DataFetch(format!(
                        "unparsable {metric} amount '{amount}' for service '{service}'"
                    ))
                })?;

            let amount = if amount < 0.0 {
                debug!("Clamping negative amount {} for {} to zero", amount, service);
                0.0
            } else {
                amount
            };

            entries.push(CostEntry::new(service.as_str(), amount));
        }
    }

    Ok(entries)
}
