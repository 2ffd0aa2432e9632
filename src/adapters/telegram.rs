use crate::domain::ports::ReportSink;
use crate::utils::error::{FareError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

/// Pushes the report to a chat through the Bot API `sendMessage` method.
/// The text is sent as plain text so offer names never break Markdown.
pub struct TelegramSink {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, token, chat_id)
    }

    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl ReportSink for TelegramSink {
    async fn deliver(&self, report: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        );

        let response = self
            .client
            .post(&url)
            .form(&[("chat_id", self.chat_id.as_str()), ("text", report)])
            .send()
            .await
            // The URL embeds the bot token.
            .map_err(|e| FareError::Delivery {
                reason: format!("request failed: {}", e.without_url()),
            })?;

        let status = response.status();
        tracing::debug!("Telegram response status: {}", status);

        let body: Option<SendMessageResponse> = response.json().await.ok();
        match body {
            Some(SendMessageResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(SendMessageResponse {
                description: Some(description),
                ..
            }) => Err(FareError::Delivery {
                reason: format!("HTTP {}: {}", status, description),
            }),
            _ => Err(FareError::Delivery {
                reason: format!("HTTP {}", status),
            }),
        }
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
