//! Slack incoming-webhook messages
//!
//! Messages are built from a closed set of block kinds. Which block accepts a
//! button or a field list is fixed by its type, so an invalid combination does
//! not compile.

use crate::log_debug;
use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

/// Link button shown at the side of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub url: String,
    pub label: String,
}

impl Button {
    fn to_json(&self) -> Value {
        json!({
            "type": "button",
            "url": self.url,
            "text": {
                "type": "plain_text",
                "text": self.label,
                "emoji": true,
            },
        })
    }
}

/// Large plain-text line, optionally with a button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    pub text: String,
    pub accessory: Option<Button>,
}

impl HeaderBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            accessory: None,
        }
    }

    pub fn with_button(mut self, url: impl Into<String>, label: impl Into<String>) -> Self {
        self.accessory = Some(Button {
            url: url.into(),
            label: label.into(),
        });
        self
    }
}

/// Markdown section with optional fields and button
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBlock {
    pub text: Option<String>,
    pub fields: Vec<String>,
    pub accessory: Option<Button>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// A section with no body text, used to carry fields and a button
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_button(mut self, url: impl Into<String>, label: impl Into<String>) -> Self {
        self.accessory = Some(Button {
            url: url.into(),
            label: label.into(),
        });
        self
    }

    pub fn with_field(mut self, text: impl Into<String>) -> Self {
        self.fields.push(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Header(HeaderBlock),
    Text(TextBlock),
    Divider,
}

impl Block {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Header(header) => header_json(header),
            Self::Text(text) => text_json(text),
            Self::Divider => json!({ "type": "divider" }),
        }
    }
}

impl From<HeaderBlock> for Block {
    fn from(block: HeaderBlock) -> Self {
        Self::Header(block)
    }
}

impl From<TextBlock> for Block {
    fn from(block: TextBlock) -> Self {
        Self::Text(block)
    }
}

fn header_json(header: &HeaderBlock) -> Value {
    let mut data = json!({
        "type": "section",
        "text": {
            "type": "plain_text",
            "text": header.text,
            "emoji": true,
        },
    });
    if let Some(button) = &header.accessory {
        data["accessory"] = button.to_json();
    }
    data
}

fn text_json(block: &TextBlock) -> Value {
    let mut data = json!({ "type": "section" });
    if let Some(text) = &block.text {
        data["text"] = json!({ "type": "mrkdwn", "text": text });
    }
    if let Some(button) = &block.accessory {
        data["accessory"] = button.to_json();
    }
    if !block.fields.is_empty() {
        data["fields"] = block
            .fields
            .iter()
            .map(|field| json!({ "type": "mrkdwn", "text": field }))
            .collect();
    }
    data
}

/// A chat message: fallback text plus rich blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackMessage {
    pub text: String,
    pub blocks: Vec<Block>,
}

impl SlackMessage {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self {
            text: fallback_text.into(),
            blocks: Vec::new(),
        }
    }

    pub fn add_block(mut self, block: impl Into<Block>) -> Self {
        self.blocks.push(block.into());
        self
    }

    pub fn add_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Block>,
    {
        self.blocks.extend(blocks.into_iter().map(Into::into));
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "text": self.text,
            "blocks": self.blocks.iter().map(Block::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Posts messages to a Slack incoming webhook
pub struct SlackWebhook {
    client: Client,
    url: String,
}

impl SlackWebhook {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create Slack client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Sends the message; any non-success response is an error
    pub async fn send(&self, message: &SlackMessage) -> Result<()> {
        log_debug!("Posting Slack message with {} blocks", message.blocks.len());

        let response = self
            .client
            .post(&self.url)
            .json(&message.to_json())
            .send()
            .await
            .context("Failed to reach Slack webhook")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("Slack webhook request failed with status {status}: {text}");
        }

        Ok(())
    }
}
