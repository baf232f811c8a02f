//! Provider test utilities
//!
//! In-process providers whose outcomes are fully controlled by the test.

use super::fixtures::ErrorFactory;
use async_trait::async_trait;
use llm_resilience::{CallContext, ChatRequest, ChatResponse, Provider, ResilienceError, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum Step {
    Succeed,
    Fail(ResilienceError),
    Panic(&'static str),
    Sleep(Duration),
}

/// Provider that plays its script in order and succeeds once it runs out
pub struct ScriptedProvider {
    name: String,
    script: Mutex<VecDeque<Step>>,
    calls: AtomicU32,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Self::named("scripted", steps)
    }

    pub fn named(name: &str, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script: Mutex::new(steps.into()),
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::new(Vec::new())
    }

    /// Fails `n` times with `err`, then succeeds
    pub fn failing(n: usize, err: ResilienceError) -> Arc<Self> {
        Self::new(vec![Step::Fail(err); n])
    }

    /// Append steps to the script
    pub fn push(&self, steps: impl IntoIterator<Item = Step>) {
        self.script.lock().extend(steps);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests as the provider received them
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn completion(&self, _ctx: &CallContext, req: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(req.clone());
        let step = self.script.lock().pop_front().unwrap_or(Step::Succeed);
        match step {
            Step::Succeed => Ok(ChatResponse::text(self.name.clone(), req.model, "ok")),
            Step::Fail(err) => Err(err),
            Step::Panic(message) => panic!("{}", message),
            Step::Sleep(delay) => {
                tokio::time::sleep(delay).await;
                Ok(ChatResponse::text(self.name.clone(), req.model, "slow"))
            }
        }
    }
}

/// Provider that can hold calls in flight until the test releases them
pub struct GatedProvider {
    failing: AtomicBool,
    gated: AtomicBool,
    started: Notify,
    release: Notify,
    calls: AtomicU32,
}

impl GatedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            failing: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            started: Notify::new(),
            release: Notify::new(),
            calls: AtomicU32::new(0),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_gated(&self, gated: bool) {
        self.gated.store(gated, Ordering::SeqCst);
    }

    /// Resolves once a gated call has entered the provider
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Let one gated call finish
    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for GatedProvider {
    fn name(&self) -> &str {
        "gated"
    }

    async fn completion(&self, _ctx: &CallContext, req: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.gated.load(Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            Err(ErrorFactory::transient())
        } else {
            Ok(ChatResponse::text("gated", req.model, "ok"))
        }
    }
}
