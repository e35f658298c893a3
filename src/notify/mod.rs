pub mod discord;

use anyhow::Result;
use chrono::{DateTime, Utc};

pub use discord::DiscordNotifier;

/// One labelled value shown under a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationField {
    pub label: String,
    pub value: String,
    /// Starts a new block in the description under this heading.
    pub heading: Option<String>,
}

impl NotificationField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            heading: None,
        }
    }

    pub fn under(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }
}

/// A classified, ready-to-deliver event. Derived from one action; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub wallet: Option<String>,
    pub fields: Vec<NotificationField>,
    /// Block explorer link for the transaction.
    pub url: String,
    pub color: u32,
    pub timestamp: DateTime<Utc>,
    pub transaction_id: String,
    /// Produced by the fallback simulator, not observed on chain.
    pub synthetic: bool,
}

impl Notification {
    /// Markdown body: wallet first, then one line per field. A field with a
    /// heading is preceded by a blank line and the bold heading.
    pub fn description(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(w) = &self.wallet {
            parts.push(format!("**Wallet:** `{w}`"));
        }
        if !self.fields.is_empty() {
            if !parts.is_empty() {
                parts.push(String::new());
            }
            for f in &self.fields {
                if let Some(h) = &f.heading {
                    parts.push(String::new());
                    parts.push(format!("**{h}:**"));
                }
                parts.push(format!("**{}:** `{}`", f.label, f.value));
            }
        }
        parts.join("\n")
    }

    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

/// Downstream delivery of finished notifications.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, n: &Notification) -> Result<()>;
    fn name(&self) -> &'static str;
}
