//! Discord webhook delivery
//!
//! Each delivery creates a temporary webhook on the target channel with the
//! bot token, posts the report through it, and deletes it again. The webhook
//! is removed even when posting fails.
//!
//! The round trip runs in its own task. A caller that stops waiting (for
//! example because a deadline fired) does not cancel the cleanup; call
//! [`DiscordWebhookSink::wait_for_cleanup`] before shutting down the runtime.

use crate::message::{MESSAGE_LIMIT, fit_message};
use async_trait::async_trait;
use costbot_core::error::{CostbotError, DeliveryStage, Result};
use costbot_core::provider::ReportSink;
use costbot_core::types::{ChartImage, DeliveryReceipt};
use reqwest::RequestBuilder;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Discord REST API root
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Name given to the temporary webhook, shown as the message author
pub const DEFAULT_WEBHOOK_NAME: &str = "aws";

#[derive(Debug, Deserialize)]
struct Webhook {
    id: String,
    token: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostedMessage {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateWebhook<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    username: &'a str,
    content: &'a str,
}

/// Connection settings shared by every request of a round trip
#[derive(Clone)]
struct DiscordApi {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    channel_id: String,
    webhook_name: String,
    request_timeout: Option<Duration>,
}

/// Posts reports to a Discord channel through a temporary webhook
pub struct DiscordWebhookSink {
    api: DiscordApi,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl DiscordWebhookSink {
    /// Create a sink for `channel_id` authenticated with `bot_token`
    pub fn new(bot_token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            api: DiscordApi {
                client: reqwest::Client::new(),
                api_base: DISCORD_API_BASE.to_string(),
                bot_token: bot_token.into(),
                channel_id: channel_id.into(),
                webhook_name: DEFAULT_WEBHOOK_NAME.to_string(),
                request_timeout: None,
            },
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Point the sink at a different API root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_webhook_name(mut self, name: impl Into<String>) -> Self {
        self.api.webhook_name = name.into();
        self
    }

    /// Reuse an existing HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.api.client = client;
        self
    }

    /// Deadline for each individual HTTP request
    ///
    /// A request that times out fails its step like any other HTTP error,
    /// so the webhook is still deleted after a slow execute.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.api.request_timeout = timeout;
        self
    }

    /// Wait until every started round trip, including its cleanup, is done
    pub async fn wait_for_cleanup(&self) {
        let tasks = std::mem::take(&mut *self.lock_in_flight());
        for task in tasks {
            if let Err(e) = task.await {
                warn!("Delivery task did not finish: {}", e);
            }
        }
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn track(&self, task: JoinHandle<()>) {
        let mut in_flight = self.lock_in_flight();
        in_flight.retain(|t| !t.is_finished());
        in_flight.push(task);
    }
}

impl DiscordApi {
    fn authorization(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    fn with_timeout(&self, request: RequestBuilder) -> RequestBuilder {
        match self.request_timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// Create, execute, then delete the webhook
    async fn round_trip(
        &self,
        content: &str,
        attachment: Option<&ChartImage>,
    ) -> Result<PostedMessage> {
        let webhook = self.create_webhook().await?;

        let sent = self.execute(&webhook, content, attachment).await;
        let cleanup = self.delete_webhook(&webhook.id).await;

        match (sent, cleanup) {
            (Ok(message), Ok(())) => Ok(message),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!("Webhook {} left behind: {}", webhook.id, cleanup_err);
                }
                Err(e)
            }
        }
    }

    async fn create_webhook(&self) -> Result<Webhook> {
        let url = format!("{}/channels/{}/webhooks", self.api_base, self.channel_id);
        let request = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&CreateWebhook {
                name: &self.webhook_name,
            });
        let response = self
            .with_timeout(request)
            .send()
            .await
            .map_err(|e| CostbotError::delivery(DeliveryStage::CreateWebhook, e.to_string()))?;

        let response = check_status(response, DeliveryStage::CreateWebhook).await?;
        let webhook: Webhook = response
            .json()
            .await
            .map_err(|e| CostbotError::delivery(DeliveryStage::CreateWebhook, e.to_string()))?;

        debug!("Created webhook {}", webhook.id);
        Ok(webhook)
    }

    async fn execute(
        &self,
        webhook: &Webhook,
        content: &str,
        attachment: Option<&ChartImage>,
    ) -> Result<PostedMessage> {
        let token = webhook.token.as_deref().ok_or_else(|| {
            CostbotError::delivery(DeliveryStage::Execute, "webhook has no token")
        })?;
        let url = format!("{}/webhooks/{}/{}?wait=true", self.api_base, webhook.id, token);

        let payload = WebhookPayload {
            username: webhook.name.as_deref().unwrap_or(&self.webhook_name),
            content,
        };
        let payload = serde_json::to_string(&payload)?;

        let mut form = Form::new().text("payload_json", payload);
        if let Some(image) = attachment {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| CostbotError::delivery(DeliveryStage::Execute, e.to_string()))?;
            form = form.part("files[0]", part);
        }

        let response = self
            .with_timeout(self.client.post(&url).multipart(form))
            .send()
            .await
            .map_err(|e| CostbotError::delivery(DeliveryStage::Execute, e.to_string()))?;

        let response = check_status(response, DeliveryStage::Execute).await?;
        response
            .json()
            .await
            .map_err(|e| CostbotError::delivery(DeliveryStage::Execute, e.to_string()))
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<()> {
        let url = format!("{}/webhooks/{}", self.api_base, webhook_id);
        let request = self
            .client
            .delete(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization());
        let response = self
            .with_timeout(request)
            .send()
            .await
            .map_err(|e| CostbotError::delivery(DeliveryStage::DeleteWebhook, e.to_string()))?;

        check_status(response, DeliveryStage::DeleteWebhook).await?;
        debug!("Deleted webhook {}", webhook_id);
        Ok(())
    }
}

async fn check_status(response: reqwest::Response, stage: DeliveryStage) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CostbotError::delivery(stage, format!("HTTP {status}: {body}")))
}

#[async_trait]
impl ReportSink for DiscordWebhookSink {
    async fn deliver(
        &self,
        content: &str,
        attachment: Option<&ChartImage>,
    ) -> Result<DeliveryReceipt> {
        let content = fit_message(content, MESSAGE_LIMIT);
        let attachment = attachment.cloned();
        let api = self.api.clone();

        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let result = api.round_trip(&content, attachment.as_ref()).await;
            // Nobody is listening once the caller gave up
            let _ = tx.send(result);
        });
        self.track(task);

        let message = rx.await.map_err(|_| {
            CostbotError::delivery(DeliveryStage::Execute, "delivery task stopped early")
        })??;

        info!(
            "Posted message {} to channel {}",
            message.id, self.api.channel_id
        );
        Ok(DeliveryReceipt {
            message_id: Some(message.id),
            channel_id: self.api.channel_id.clone(),
        })
    }
}
