//! Rate limiting
//!
//! [`GovernorRateLimiter`] implements the blocking
//! [`RateLimiter`](crate::core::traits::RateLimiter) capability with a token
//! bucket.

mod limiter;


pub use limiter::GovernorRateLimiter;
