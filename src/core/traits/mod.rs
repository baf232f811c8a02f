//! Core traits module
//!
//! Capabilities the resilience layer consumes from its collaborators.

pub mod cache;
pub mod error_mapper;
pub mod metrics;
pub mod provider;
pub mod rate_limiter;
pub mod validator;

pub use cache::ResponseCache;
pub use error_mapper::{ErrorMapper, StatusErrorMapper, map_http_error, read_error_message};
pub use metrics::MetricsCollector;
pub use provider::{ChunkStream, Provider};
pub use rate_limiter::RateLimiter;
pub use validator::RequestValidator;
