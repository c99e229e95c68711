// Bot API reference: https://core.telegram.org/bots/api#sendmessage

pub mod models;

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;

use crate::models::{ApiResponse, SendMessageRequest};

const API_BASE: &str = "https://api.telegram.org";

/// Hard limit on a single message's text.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Hard limit on a document caption.
pub const MAX_CAPTION_CHARS: usize = 1024;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram is not configured (missing bot token or chat id)")]
    NotConfigured,

    #[error("request to Telegram failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram returned an error ({status}): {description}")]
    Api { status: u16, description: String },
}

pub type Result<T> = std::result::Result<T, TelegramError>;

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramOptions {
    /// Both token and chat id are present.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TelegramService {
    options: TelegramOptions,
    client: Client,
    api_base: String,
}

impl TelegramService {
    pub fn new(options: TelegramOptions) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            options,
            client,
            api_base: API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.options.is_configured()
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.options.bot_token, method)
    }

    /// Send `text`, split into as many messages as the length limit requires.
    ///
    /// Returns the number of messages sent.
    pub async fn send_message(&self, text: &str) -> Result<usize> {
        if !self.is_configured() {
            return Err(TelegramError::NotConfigured);
        }

        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        for chunk in &chunks {
            let body = SendMessageRequest {
                chat_id: &self.options.chat_id,
                text: chunk,
                parse_mode: None,
                disable_web_page_preview: true,
            };
            let response = self
                .client
                .post(self.method_url("sendMessage"))
                .json(&body)
                .send()
                .await?;
            check_response(response).await?;
        }

        tracing::debug!(chunks = chunks.len(), "Sent Telegram message");
        Ok(chunks.len())
    }

    /// Upload `bytes` as a document with an optional caption.
    pub async fn send_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        caption: Option<&str>,
    ) -> Result<()> {
        if !self.is_configured() {
            return Err(TelegramError::NotConfigured);
        }

        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let mut form = Form::new()
            .text("chat_id", self.options.chat_id.clone())
            .part("document", part);
        if let Some(caption) = caption {
            form = form.text("caption", truncate_chars(caption, MAX_CAPTION_CHARS));
        }

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        check_response(response).await?;

        tracing::debug!(file_name, "Sent Telegram document");
        Ok(())
    }
}

async fn check_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let parsed: Option<ApiResponse> = serde_json::from_str(&text).ok();

    match parsed {
        Some(api) if status.is_success() && api.ok => Ok(()),
        Some(api) => Err(TelegramError::Api {
            status: api.error_code.unwrap_or(status.as_u16()),
            description: api.description.unwrap_or(text),
        }),
        None => Err(TelegramError::Api {
            status: status.as_u16(),
            description: text,
        }),
    }
}

/// Split on line boundaries so every chunk has at most `limit` characters.
///
/// Lines longer than the limit are hard-split.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                if piece.len() == limit {
                    chunks.push(piece.iter().collect());
                } else {
                    current = piece.iter().collect();
                    current_len = piece.len();
                }
            }
        } else {
            current.push_str(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
