//! Metrics recording middleware

use crate::core::middleware::chain::{Handler, Middleware};
use crate::core::traits::MetricsCollector;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Instant;

/// Reports latency, outcome and token usage to a [`MetricsCollector`]
#[derive(Clone)]
pub struct MetricsMiddleware {
    collector: Arc<dyn MetricsCollector>,
}

impl MetricsMiddleware {
    pub fn new(collector: Arc<dyn MetricsCollector>) -> Self {
        Self { collector }
    }
}

impl Middleware for MetricsMiddleware {
    fn name(&self) -> &str {
        "metrics"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let collector = self.collector.clone();
        Arc::new(move |ctx, req| {
            let next = next.clone();
            let collector = collector.clone();
            async move {
                let model = req.model.clone();
                let start = Instant::now();
                let result = next(ctx, req).await;

                collector.record_request(&model, start.elapsed(), result.is_ok());
                if let Ok(resp) = &result {
                    collector.record_tokens(&model, resp.usage.total_tokens);
                }
                result
            }
            .boxed()
        })
    }
}
