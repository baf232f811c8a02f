//! Built-in middlewares

mod breaker;
mod cache;
mod headers;
mod logging;
mod metrics;
mod rate_limit;
mod recovery;
mod retry;
mod timeout;
mod trace;
mod transform;
mod validator;

pub use breaker::CircuitBreakerMiddleware;
pub use cache::CacheMiddleware;
pub use headers::HeadersMiddleware;
pub use logging::LoggingMiddleware;
pub use metrics::MetricsMiddleware;
pub use rate_limit::RateLimitMiddleware;
pub use recovery::{PanicObserver, RecoveryMiddleware};
pub use retry::{
    BackoffStrategy, JITTER_FACTOR, RetryMiddleware, RetryObserver, RetryPredicate, apply_jitter,
};
pub use timeout::TimeoutMiddleware;
pub use trace::TracingMiddleware;
pub use transform::{RequestTransform, ResponseTransform, TransformMiddleware};
pub use validator::{MaxTokensLimit, RequireMessages, RequireModel, ValidatorMiddleware};
