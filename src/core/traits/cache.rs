//! Response cache capability

use crate::core::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;

/// Response cache consulted by the cache middleware
///
/// Backing stores must be safe for concurrent `get`/`set`; eviction and expiry
/// are the implementation's choice.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Deterministic key for a request
    fn key(&self, req: &ChatRequest) -> String;

    async fn get(&self, key: &str) -> Option<ChatResponse>;

    async fn set(&self, key: String, resp: ChatResponse);
}
