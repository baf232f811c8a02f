//! # llm-resilience
//!
//! Resilient call execution for multi-provider AI gateways.
//!
//! ## Features
//!
//! - **Circuit Breaker**: Closed/Open/HalfOpen breaker with a bounded probe budget
//! - **Middleware Chain**: Recovery, tracing, metrics, caching, timeouts, rate limiting and retries
//! - **Request Rewriting**: Ordered normalization before the call leaves the gateway
//! - **Error Taxonomy**: Upstream failures classified with a retryable flag
//! - **Configuration**: YAML or environment driven, with per-provider overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use llm_resilience::{
//!     CallContext, ChatRequest, ChatResponse, Message, Provider, ResilienceConfig,
//!     ResilientProvider, Result,
//! };
//! use std::sync::Arc;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Provider for Echo {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     async fn completion(&self, _ctx: &CallContext, req: ChatRequest) -> Result<ChatResponse> {
//!         Ok(ChatResponse::text("echo", req.model, "hello"))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ResilienceConfig::from_env()?;
//!     llm_resilience::init_tracing(&config.logging)?;
//!
//!     let provider = ResilientProvider::from_config(Arc::new(Echo), &config)?;
//!     let req = ChatRequest::new("gpt-4", vec![Message::user("Hello")]);
//!     let resp = provider.call(&CallContext::new(), req).await?;
//!     println!("{}", resp.content().unwrap_or_default());
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::ResilienceConfig;
pub use utils::error::{ResilienceError, Result};
pub use utils::logging::init_tracing;

pub use core::circuit_breaker::{BreakerConfig, BreakerMetrics, CircuitBreaker, CircuitState};
pub use core::context::CallContext;
pub use core::middleware::{Handler, Middleware, MiddlewareChain, handler_fn};
pub use core::resilient::{ResilientProvider, ResilientProviderBuilder};
pub use core::rewriter::{RequestRewriter, RewriterChain};
pub use core::traits::{
    ChunkStream, ErrorMapper, MetricsCollector, Provider, RateLimiter, RequestValidator,
    ResponseCache,
};
pub use core::types::{
    ChatRequest, ChatResponse, ChatUsage, ClassifiedError, ErrorCode, Message, Role, StreamChunk,
    ToolSchema,
};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
