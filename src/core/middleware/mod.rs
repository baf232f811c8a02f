//! Middleware chain
//!
//! Composable call-wrapping behaviors around a base [`Handler`]. The first
//! registered middleware runs outermost:
//!
//! ```rust,no_run
//! use llm_resilience::core::middleware::{
//!     MiddlewareChain, RecoveryMiddleware, RetryMiddleware, TimeoutMiddleware, handler_fn,
//! };
//! use llm_resilience::{ChatResponse, ChatRequest, CallContext};
//! use std::time::Duration;
//!
//! # async fn demo() -> llm_resilience::Result<()> {
//! let chain = MiddlewareChain::new()
//!     .with(RecoveryMiddleware::new())
//!     .with(TimeoutMiddleware::new(Duration::from_secs(30)))
//!     .with(RetryMiddleware::new(2, Duration::from_millis(100)));
//!
//! let handler = chain.then(handler_fn(|_ctx, req: ChatRequest| async move {
//!     Ok(ChatResponse::text("echo", req.model, "hello"))
//! }));
//! let resp = handler(CallContext::new(), ChatRequest::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod builtin;
mod chain;
mod panic;


pub use builtin::*;
pub use chain::{FnMiddleware, Handler, Middleware, MiddlewareChain, handler_fn, middleware_fn};
