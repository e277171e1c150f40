//! Source trait: where raw entities come from.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Entity;

/// Fetches every entity of kind `E` that one tenant rule asks for.
///
/// Retries and backoff are the implementation's concern; callers treat an
/// error as "this source contributed nothing this cycle".
#[async_trait]
pub trait Source<E: Entity>: Send + Sync {
    async fn fetch(&self, rule: &E::Rule) -> Result<Vec<E>>;
}
