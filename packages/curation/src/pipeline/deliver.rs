//! Delivery fan-out: digest text first, then the report file.

use std::path::Path;

use tracing::{info, warn};

use crate::traits::delivery::DeliveryChannel;
use crate::types::report::RunSummary;

/// Outcome of delivering one digest through one channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryReport {
    /// Digest text accepted by the channel
    pub message_sent: bool,

    /// Report file accepted by the channel (false when there was none)
    pub file_sent: bool,

    /// One entry per failed send, prefixed with the channel name
    pub errors: Vec<String>,
}

impl DeliveryReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing failed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Copy failures into the run summary.
    pub fn record(&self, summary: &mut RunSummary) {
        summary.delivery_failures.extend(self.errors.iter().cloned());
    }
}

/// Send `message`, then the optional report file with `caption`.
///
/// Each step is attempted independently; a failed message does not stop the
/// file upload. Never returns an error.
pub async fn deliver(
    channel: &dyn DeliveryChannel,
    message: &str,
    report_file: Option<(&Path, &str)>,
) -> DeliveryReport {
    let mut report = DeliveryReport::new();

    match channel.send(message).await {
        Ok(()) => {
            report.message_sent = true;
            info!(channel = channel.name(), chars = message.chars().count(), "Digest sent");
        }
        Err(e) => {
            warn!(channel = channel.name(), error = %e, "Digest send failed");
            report.errors.push(format!("{}: message: {}", channel.name(), e));
        }
    }

    if let Some((path, caption)) = report_file {
        match channel.send_file(path, Some(caption)).await {
            Ok(()) => {
                report.file_sent = true;
                info!(channel = channel.name(), path = %path.display(), "Report file sent");
            }
            Err(e) => {
                warn!(channel = channel.name(), path = %path.display(), error = %e, "Report file send failed");
                report.errors.push(format!("{}: file: {}", channel.name(), e));
            }
        }
    }

    report
}
