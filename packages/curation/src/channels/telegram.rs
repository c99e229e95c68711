//! Telegram bot chat as a [`DeliveryChannel`].

use std::path::Path;

use async_trait::async_trait;
use ::telegram::{TelegramError, TelegramService};

use crate::error::{DeliveryError, DeliveryResult};
use crate::traits::delivery::DeliveryChannel;

pub struct TelegramChannel {
    service: TelegramService,
}

impl TelegramChannel {
    pub fn new(service: TelegramService) -> Self {
        Self { service }
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_configured()
    }
}

#[async_trait]
impl DeliveryChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> DeliveryResult<()> {
        self.service
            .send_message(text)
            .await
            .map(|_| ())
            .map_err(delivery_error)
    }

    async fn send_file(&self, path: &Path, caption: Option<&str>) -> DeliveryResult<()> {
        if !self.service.is_configured() {
            return Err(DeliveryError::NotConfigured);
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DeliveryError::File {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.md".to_string());

        self.service
            .send_document(&file_name, bytes, caption)
            .await
            .map_err(delivery_error)
    }
}

fn delivery_error(err: TelegramError) -> DeliveryError {
    match err {
        TelegramError::NotConfigured => DeliveryError::NotConfigured,
        other => DeliveryError::Send(Box::new(other)),
    }
}
