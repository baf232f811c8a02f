//! Retry-with-backoff middleware

use crate::core::middleware::chain::{Handler, Middleware};
use crate::core::middleware::panic::{call_catching, panic_message};
use crate::utils::error::ResilienceError;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Decides whether a failed attempt is worth repeating
pub type RetryPredicate = Arc<dyn Fn(&ResilienceError) -> bool + Send + Sync>;

/// Invoked before each backoff wait with `(retry, error, delay)`; `retry` is 1-based
pub type RetryObserver = Arc<dyn Fn(u32, &ResilienceError, Duration) + Send + Sync>;

/// Total jitter spread as a fraction of the delay (plus or minus half of it)
pub const JITTER_FACTOR: f64 = 0.1;

/// Spread `delay` by `sample` in `[0, 1)` within [`JITTER_FACTOR`]
pub fn apply_jitter(delay: Duration, sample: f64) -> Duration {
    let millis = delay.as_millis() as f64;
    let jitter = millis * JITTER_FACTOR * (sample - 0.5);
    Duration::from_millis((millis + jitter).max(0.0) as u64)
}

/// Delay between attempts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// `step * n` before the n-th retry
    Linear { step_ms: u64 },
    /// `initial * multiplier^(n-1)` before the n-th retry, capped at `max_ms`
    Exponential {
        initial_ms: u64,
        max_ms: u64,
        multiplier: f64,
    },
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Linear { step_ms: 100 }
    }
}

impl BackoffStrategy {
    pub fn linear(step: Duration) -> Self {
        Self::Linear {
            step_ms: step.as_millis() as u64,
        }
    }

    pub fn exponential(initial: Duration, max: Duration, multiplier: f64) -> Self {
        Self::Exponential {
            initial_ms: initial.as_millis() as u64,
            max_ms: max.as_millis() as u64,
            multiplier,
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Self::Linear { step_ms } => {
                Duration::from_millis(step_ms.saturating_mul(u64::from(retry)))
            }
            Self::Exponential {
                initial_ms,
                max_ms,
                multiplier,
            } => {
                let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
                let delay = initial_ms as f64 * multiplier.max(1.0).powi(exponent);
                Duration::from_millis(delay.min(max_ms as f64) as u64)
            }
        }
    }
}

/// Repeats failed calls up to `max_retries` extra times
///
/// A panicking attempt counts as a failed attempt. When the last attempt
/// panics the panic resumes unwinding with its original payload.
#[derive(Clone)]
pub struct RetryMiddleware {
    max_retries: u32,
    backoff: BackoffStrategy,
    jitter: bool,
    retry_if: RetryPredicate,
    on_retry: Option<RetryObserver>,
}

impl RetryMiddleware {
    /// Linear backoff: waits `backoff * n` before the n-th retry
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff: BackoffStrategy::linear(backoff),
            jitter: false,
            retry_if: Arc::new(|e: &ResilienceError| !e.is_cancellation()),
            on_retry: None,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Randomize each backoff delay by up to plus or minus 5%
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Observe every retry before its backoff wait
    ///
    /// A panicking attempt is reported as [`ResilienceError::PanicRecovered`].
    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(u32, &ResilienceError, Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    /// Only retry errors matching `predicate`; context errors are never retried
    pub fn retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ResilienceError) -> bool + Send + Sync + 'static,
    {
        self.retry_if = Arc::new(predicate);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff(&self) -> &BackoffStrategy {
        &self.backoff
    }

    pub fn jitter(&self) -> bool {
        self.jitter
    }

    /// Delay before retry number `retry`, jittered when enabled
    pub fn delay(&self, retry: u32) -> Duration {
        let delay = self.backoff.delay(retry);
        if self.jitter {
            apply_jitter(delay, rand::random::<f64>())
        } else {
            delay
        }
    }
}

impl fmt::Debug for RetryMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryMiddleware")
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("jitter", &self.jitter)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

impl Middleware for RetryMiddleware {
    fn name(&self) -> &str {
        "retry"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let policy = self.clone();
        Arc::new(move |ctx, req| {
            let next = next.clone();
            let policy = policy.clone();
            async move {
                let mut retry = 0;
                loop {
                    let last = retry >= policy.max_retries;
                    let failure = match call_catching(&next, ctx.clone(), req.clone()).await {
                        Ok(Ok(resp)) => return Ok(resp),
                        Ok(Err(e))
                            if last
                                || e.is_cancellation()
                                || ctx.is_done()
                                || !(policy.retry_if)(&e) =>
                        {
                            return Err(e);
                        }
                        Ok(Err(e)) => {
                            warn!(model = %req.model, attempt = retry + 1, error = %e, "attempt failed, retrying");
                            e
                        }
                        Err(payload) if last => panic::resume_unwind(payload),
                        Err(payload) => {
                            let message = panic_message(&*payload);
                            warn!(
                                model = %req.model,
                                attempt = retry + 1,
                                panic = %message,
                                "attempt panicked, retrying"
                            );
                            ResilienceError::panic_recovered(message)
                        }
                    };

                    retry += 1;
                    let delay = policy.delay(retry);
                    if let Some(on_retry) = &policy.on_retry {
                        on_retry(retry, &failure, delay);
                    }
                    debug!(retry, delay_ms = delay.as_millis() as u64, "backing off");
                    ctx.sleep(delay).await?;
                }
            }
            .boxed()
        })
    }
}
