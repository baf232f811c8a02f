//! Circuit breaker state machine

use super::types::{BreakerConfig, BreakerMetrics, CircuitState, StateChangeCallback};
use crate::core::context::CallContext;
use crate::core::traits::error_mapper::{ErrorMapper, StatusErrorMapper};
use crate::utils::error::{ResilienceError, Result};
use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type Transition = (CircuitState, CircuitState);

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
    half_open_calls: u32,
    /// Bumped on every transition; outcomes from earlier generations are stale
    generation: u64,
}

/// Ticket handed out on admission
#[derive(Debug, Clone, Copy)]
struct Permit {
    generation: u64,
    probe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
    /// Released without counting: caller cancellation, rejection further down
    Neutral,
}

/// Per-endpoint circuit breaker
///
/// Shared by every task calling the same protected endpoint. All transitions
/// happen under one lock; the state-change observer runs on a dedicated thread
/// and receives transitions in the order they occurred.
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
    observer: Option<mpsc::UnboundedSender<Transition>>,
}

impl CircuitBreaker {
    /// Create a breaker; zero config fields fall back to defaults
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        let name = name.into();
        let config = config.normalized();
        let observer = config
            .on_state_change
            .clone()
            .and_then(|callback| spawn_observer(&name, callback));

        Self {
            name,
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
                half_open_calls: 0,
                generation: 0,
            }),
            observer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn metrics(&self) -> BreakerMetrics {
        let inner = self.inner.lock();
        BreakerMetrics {
            state: inner.state,
            failure_count: inner.failure_count,
            half_open_calls: inner.half_open_calls,
        }
    }

    /// Execute `f` under the breaker
    pub async fn call<F, Fut>(&self, ctx: &CallContext, f: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.call_with_result(ctx, f).await
    }

    /// Execute `f` under the breaker, returning its value
    ///
    /// Rejected calls return [`ResilienceError::CircuitOpen`] or
    /// [`ResilienceError::TooManyCallsInHalfOpen`] without invoking `f`. A call
    /// running past [`BreakerConfig::timeout`] is abandoned, counted as a failure
    /// and returned as a retryable 504 classified error.
    pub async fn call_with_result<F, Fut, T>(&self, ctx: &CallContext, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        let mut guard = CallGuard {
            breaker: self,
            ctx,
            permit: Some(self.admit()?),
        };

        let fut = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(fut) => fut,
            Err(payload) => {
                guard.finish(Outcome::Failure);
                panic::resume_unwind(payload)
            }
        };

        let timeout = self.config.timeout;
        match tokio::time::timeout(timeout, AssertUnwindSafe(fut).catch_unwind()).await {
            Ok(Ok(result)) => {
                guard.finish(outcome_of(ctx, &result));
                result
            }
            Ok(Err(payload)) => {
                guard.finish(Outcome::Failure);
                panic::resume_unwind(payload)
            }
            Err(_) => {
                warn!(
                    breaker = %self.name,
                    timeout_ms = timeout.as_millis() as u64,
                    "protected call timed out"
                );
                guard.finish(Outcome::Failure);
                Err(StatusErrorMapper::new(self.name.as_str())
                    .map_timeout_error(timeout)
                    .into())
            }
        }
    }

    /// Force the breaker Closed and clear every counter
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.failure_count = 0;
        inner.half_open_calls = 0;
        inner.opened_at = None;
        if inner.state != CircuitState::Closed {
            self.transition(&mut inner, CircuitState::Closed);
        }
        debug!(breaker = %self.name, "circuit breaker reset");
    }

    fn admit(&self) -> Result<Permit> {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => Ok(Permit {
                generation: inner.generation,
                probe: false,
            }),
            CircuitState::Open => {
                let cooled_down = inner
                    .opened_at
                    .is_none_or(|opened| opened.elapsed() >= self.config.reset_timeout);
                if !cooled_down {
                    return Err(ResilienceError::CircuitOpen);
                }
                self.transition(&mut inner, CircuitState::HalfOpen);
                inner.half_open_calls = 1;
                Ok(Permit {
                    generation: inner.generation,
                    probe: true,
                })
            }
            CircuitState::HalfOpen => {
                if inner.half_open_calls >= self.config.half_open_max_calls {
                    return Err(ResilienceError::TooManyCallsInHalfOpen);
                }
                inner.half_open_calls += 1;
                Ok(Permit {
                    generation: inner.generation,
                    probe: true,
                })
            }
        }
    }

    fn record(&self, permit: Permit, outcome: Outcome) {
        let mut inner = self.inner.lock();
        let current = permit.generation == inner.generation;

        if permit.probe && current && inner.state == CircuitState::HalfOpen {
            inner.half_open_calls = inner.half_open_calls.saturating_sub(1);
        }

        match (inner.state, outcome) {
            (_, Outcome::Neutral) | (CircuitState::Open, _) => {}
            (CircuitState::Closed, _) if !current => {}
            (CircuitState::Closed, Outcome::Success) => inner.failure_count = 0,
            (CircuitState::Closed, Outcome::Failure) => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.threshold {
                    warn!(
                        breaker = %self.name,
                        failures = inner.failure_count,
                        "circuit breaker tripped"
                    );
                    inner.opened_at = Some(Instant::now());
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
            (CircuitState::HalfOpen, _) if !current => {}
            (CircuitState::HalfOpen, Outcome::Success) => {
                info!(breaker = %self.name, "circuit breaker recovered");
                inner.failure_count = 0;
                inner.half_open_calls = 0;
                inner.opened_at = None;
                self.transition(&mut inner, CircuitState::Closed);
            }
            (CircuitState::HalfOpen, Outcome::Failure) => {
                warn!(breaker = %self.name, "circuit breaker probe failed, reopening");
                inner.half_open_calls = 0;
                inner.opened_at = Some(Instant::now());
                self.transition(&mut inner, CircuitState::Open);
            }
        }
    }

    /// Must be called with the lock held so observers see transitions in order
    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        inner.generation += 1;
        debug!(breaker = %self.name, %from, %to, "circuit breaker state change");

        if let Some(observer) = &self.observer {
            let _ = observer.send((from, to));
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("inner", &*self.inner.lock())
            .finish()
    }
}

/// Records the outcome of an admitted call exactly once
struct CallGuard<'a> {
    breaker: &'a CircuitBreaker,
    ctx: &'a CallContext,
    permit: Option<Permit>,
}

impl CallGuard<'_> {
    fn finish(&mut self, outcome: Outcome) {
        if let Some(permit) = self.permit.take() {
            self.breaker.record(permit, outcome);
        }
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        // Dropped before completion: either the layer's own deadline fired
        // (an upstream timeout) or the caller abandoned the call
        let outcome = if std::thread::panicking() || self.ctx.call_timed_out() {
            Outcome::Failure
        } else {
            Outcome::Neutral
        };
        self.finish(outcome);
    }
}

fn outcome_of<T>(ctx: &CallContext, result: &Result<T>) -> Outcome {
    match result {
        Ok(_) => Outcome::Success,
        Err(e) if e.is_breaker_rejection() => Outcome::Neutral,
        Err(_) if ctx.call_timed_out() => Outcome::Failure,
        Err(e) if e.is_cancellation() || ctx.is_done() => Outcome::Neutral,
        Err(_) => Outcome::Failure,
    }
}

fn spawn_observer(
    name: &str,
    callback: StateChangeCallback,
) -> Option<mpsc::UnboundedSender<Transition>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Transition>();
    let breaker = name.to_string();

    let spawned = std::thread::Builder::new()
        .name(format!("breaker-observer-{name}"))
        .spawn(move || {
            while let Some((from, to)) = rx.blocking_recv() {
                if panic::catch_unwind(AssertUnwindSafe(|| callback(from, to))).is_err() {
                    warn!(breaker = %breaker, %from, %to, "state change observer panicked");
                }
            }
        });

    match spawned {
        Ok(_) => Some(tx),
        Err(e) => {
            warn!(breaker = %name, error = %e, "failed to start state change observer");
            None
        }
    }
}
