//! Provider capability
//!
//! The raw upstream call wrapped by the resilience layer. Implementations own
//! the vendor-specific HTTP translation and must classify every failure through
//! an [`ErrorMapper`](super::error_mapper::ErrorMapper) before returning it.

use crate::core::context::CallContext;
use crate::core::types::{ChatRequest, ChatResponse, ClassifiedError, StreamChunk};
use crate::utils::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stream of response chunks
pub type ChunkStream = BoxStream<'static, Result<StreamChunk>>;

/// Unified LLM provider interface
#[async_trait]
pub trait Provider: Send + Sync {
    /// Unique provider identifier
    fn name(&self) -> &str;

    /// Synchronous chat completion
    async fn completion(&self, ctx: &CallContext, req: ChatRequest) -> Result<ChatResponse>;

    /// Streaming chat completion
    async fn stream(&self, _ctx: &CallContext, _req: ChatRequest) -> Result<ChunkStream> {
        Err(ClassifiedError::invalid_request(self.name(), "streaming not supported").into())
    }
}
