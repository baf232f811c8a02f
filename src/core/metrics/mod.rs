//! Metrics collectors
//!
//! [`NoopMetrics`] is the default sink; [`InMemoryMetrics`] keeps per-model
//! counters for tests and embedders without a metrics backend.

use crate::core::traits::MetricsCollector;
use dashmap::DashMap;
use serde::Serialize;
use std::time::Duration;

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsCollector for NoopMetrics {
    fn record_request(&self, _model: &str, _duration: Duration, _success: bool) {}

    fn record_tokens(&self, _model: &str, _tokens: u32) {}
}

/// Per-model counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelMetrics {
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub tokens: u64,
    pub total_latency: Duration,
}

impl ModelMetrics {
    /// Mean latency over every recorded request
    pub fn average_latency(&self) -> Duration {
        match u32::try_from(self.requests) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_latency / n,
            Err(_) => Duration::from_secs_f64(self.total_latency.as_secs_f64() / self.requests as f64),
        }
    }
}

/// Concurrent in-memory collector
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    models: DashMap<String, ModelMetrics>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, model: &str) -> Option<ModelMetrics> {
        self.models.get(model).map(|m| m.value().clone())
    }

    pub fn models(&self) -> Vec<String> {
        self.models.iter().map(|e| e.key().clone()).collect()
    }

    pub fn reset(&self) {
        self.models.clear();
    }
}

impl MetricsCollector for InMemoryMetrics {
    fn record_request(&self, model: &str, duration: Duration, success: bool) {
        let mut entry = self.models.entry(model.to_string()).or_default();
        entry.requests += 1;
        if success {
            entry.successes += 1;
        } else {
            entry.failures += 1;
        }
        entry.total_latency += duration;
    }

    fn record_tokens(&self, model: &str, tokens: u32) {
        self.models.entry(model.to_string()).or_default().tokens += u64::from(tokens);
    }
}
