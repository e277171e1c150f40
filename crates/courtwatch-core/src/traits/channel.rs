//! Channel trait: outbound text sinks.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name, used in logs.
    fn name(&self) -> &str;

    /// Deliver a plain-text message.
    async fn send(&self, text: &str) -> Result<()>;
}
