//! TTL and capacity bounded response cache backed by `moka`

use crate::core::traits::ResponseCache;
use crate::core::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// In-process response cache
///
/// Entries expire `ttl` after insertion; beyond `max_capacity` entries the
/// least valuable ones are evicted.
#[derive(Clone)]
pub struct MokaResponseCache {
    entries: Cache<String, ChatResponse>,
    ttl: Duration,
}

impl MokaResponseCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Apply pending inserts and evictions
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }

    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

impl std::fmt::Debug for MokaResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaResponseCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

/// SHA-256 over the fields that determine a completion
///
/// Routing metadata (trace id, tenant, headers) does not take part, so equal
/// prompts from different callers share an entry.
pub fn request_cache_key(req: &ChatRequest) -> String {
    let canonical = serde_json::json!({
        "model": req.model,
        "messages": req.messages,
        "tools": req.tools,
        "tool_choice": req.tool_choice,
        "temperature": req.temperature,
        "top_p": req.top_p,
        "max_tokens": req.max_tokens,
        "stop": req.stop,
    });

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ResponseCache for MokaResponseCache {
    fn key(&self, req: &ChatRequest) -> String {
        request_cache_key(req)
    }

    async fn get(&self, key: &str) -> Option<ChatResponse> {
        self.entries.get(key).await
    }

    async fn set(&self, key: String, resp: ChatResponse) {
        self.entries.insert(key, resp).await;
    }
}
