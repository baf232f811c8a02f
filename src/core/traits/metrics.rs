//! Metrics collection capability

use std::time::Duration;

/// Sink for per-request metrics
///
/// Injected into the layer instead of global registries; the default is
/// [`NoopMetrics`](crate::core::metrics::NoopMetrics).
pub trait MetricsCollector: Send + Sync {
    fn record_request(&self, model: &str, duration: Duration, success: bool);

    fn record_tokens(&self, model: &str, tokens: u32);
}
