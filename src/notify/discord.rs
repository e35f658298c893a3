use super::{Notification, Notifier};
use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

const DEFAULT_FOOTER: &str = "HoneyFarms Contract Activity";

/// Posts notifications as embeds to a Discord webhook.
#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
    footer: String,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
            footer: DEFAULT_FOOTER.to_string(),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn payload(&self, n: &Notification) -> DiscordWebhookPayload {
        DiscordWebhookPayload {
            content: None,
            embeds: vec![DiscordEmbed {
                title: n.title.clone(),
                description: n.description(),
                url: n.url.clone(),
                color: n.color,
                timestamp: n.timestamp.to_rfc3339(),
                footer: DiscordFooter {
                    text: self.footer.clone(),
                },
            }],
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, n: &Notification) -> Result<()> {
        let payload = self.payload(n);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            let err = match res {
                Ok(rsp) => {
                    let status = rsp.status();
                    if status.is_success() {
                        return Ok(());
                    }
                    let e = anyhow!("Discord webhook HTTP error: {status}");
                    if !is_retryable(status) {
                        return Err(e);
                    }
                    e
                }
                Err(e) => anyhow!("Discord webhook request failed: {e}"),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            tracing::debug!(attempt, error = %err, "retrying Discord webhook");
            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
        }
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

/// A rejected payload or revoked webhook fails the same way every time.
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || !status.is_client_error()
}

#[derive(Debug, Serialize)]
pub struct DiscordFooter {
    text: String,
}

#[derive(Debug, Serialize)]
pub struct DiscordEmbed {
    title: String,
    description: String,
    url: String,
    color: u32,
    timestamp: String,
    footer: DiscordFooter,
}

#[derive(Debug, Serialize)]
pub struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}
