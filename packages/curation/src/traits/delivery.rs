//! Delivery channel trait.

use std::path::Path;

use async_trait::async_trait;

use crate::error::DeliveryResult;

/// Where finished digests go. Failures are reported, never fatal.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    async fn send(&self, text: &str) -> DeliveryResult<()>;

    async fn send_file(&self, path: &Path, caption: Option<&str>) -> DeliveryResult<()>;
}
