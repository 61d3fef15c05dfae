//! Webhook notification delivery
//!
//! Bundles go out as Discord-style embeds, fallback notices as plain content.
//! Delivery is best-effort: one attempt, no retries.

use anyhow::{Context, Result};
use calendar_pipeline::{BlockField, CalendarError, MessageBlock, NotificationSink, OutboundMessage};
use serde::Serialize;
use std::time::Duration;

/// JSON body posted to the webhook
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<Embed<'a>>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
    fields: &'a [BlockField],
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<EmbedFooter<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedFooter<'a> {
    text: &'a str,
}

impl<'a> From<&'a MessageBlock> for Embed<'a> {
    fn from(block: &'a MessageBlock) -> Self {
        Self {
            title: &block.title,
            description: &block.description,
            color: block.color.0,
            fields: &block.fields,
            footer: block.footer.as_deref().map(|text| EmbedFooter { text }),
        }
    }
}

impl<'a> From<&'a OutboundMessage> for WebhookPayload<'a> {
    fn from(message: &'a OutboundMessage) -> Self {
        match message {
            OutboundMessage::Bundle(bundle) => Self {
                content: None,
                embeds: bundle.blocks.iter().map(Embed::from).collect(),
            },
            OutboundMessage::Text(text) => Self {
                content: Some(text.as_str()),
                embeds: Vec::new(),
            },
        }
    }
}

/// Posts messages to a webhook URL
pub struct WebhookSink {
    client: reqwest::blocking::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build webhook HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl NotificationSink for WebhookSink {
    fn deliver(&self, message: &OutboundMessage) -> calendar_pipeline::Result<()> {
        let payload = WebhookPayload::from(message);

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|e| CalendarError::Delivery(format!("Webhook request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CalendarError::Delivery(format!("Webhook returned {}: {}", status, body)));
        }

        log::info!("Webhook accepted notification ({})", status);
        Ok(())
    }
}

/// Prints the webhook payload instead of sending it (--dry-run)
pub struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn deliver(&self, message: &OutboundMessage) -> calendar_pipeline::Result<()> {
        let json = serde_json::to_string_pretty(&WebhookPayload::from(message))
            .map_err(|e| CalendarError::Delivery(format!("Failed to encode payload: {}", e)))?;
        println!("{}", json);
        Ok(())
    }
}
