//! Token bucket rate limiter backed by `governor`

use crate::core::context::CallContext;
use crate::core::traits::RateLimiter;
use crate::utils::error::{ResilienceError, Result};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use std::fmt;
use std::num::NonZeroU32;

/// Process-local token bucket shared by every call through one provider
pub struct GovernorRateLimiter {
    limiter: DefaultDirectRateLimiter,
    requests_per_second: u32,
    burst: u32,
}

impl GovernorRateLimiter {
    /// Allow `requests_per_second` sustained, with bursts up to `burst`
    ///
    /// A zero burst falls back to `requests_per_second`.
    pub fn new(requests_per_second: u32, burst: u32) -> Result<Self> {
        let rate = NonZeroU32::new(requests_per_second).ok_or_else(|| {
            ResilienceError::config("rate limit requests_per_second must be greater than 0")
        })?;
        let burst = NonZeroU32::new(burst).unwrap_or(rate);

        Ok(Self {
            limiter: governor::RateLimiter::direct(Quota::per_second(rate).allow_burst(burst)),
            requests_per_second: rate.get(),
            burst: burst.get(),
        })
    }

    /// Take a permit without waiting
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }
}

impl fmt::Debug for GovernorRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GovernorRateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .field("burst", &self.burst)
            .finish()
    }
}

#[async_trait]
impl RateLimiter for GovernorRateLimiter {
    async fn wait(&self, ctx: &CallContext) -> Result<()> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        ctx.run(self.limiter.until_ready()).await
    }
}
