//! Panic recovery middleware

use crate::core::middleware::chain::{Handler, Middleware};
use crate::core::middleware::panic::{call_catching, panic_message};
use crate::utils::error::ResilienceError;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Receives the original panic payload
pub type PanicObserver = Arc<dyn Fn(&(dyn Any + Send)) + Send + Sync>;

/// Converts panics in inner stages into [`ResilienceError::PanicRecovered`]
#[derive(Clone, Default)]
pub struct RecoveryMiddleware {
    observer: Option<PanicObserver>,
}

impl RecoveryMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer<F>(observer: F) -> Self
    where
        F: Fn(&(dyn Any + Send)) + Send + Sync + 'static,
    {
        Self {
            observer: Some(Arc::new(observer)),
        }
    }

    pub fn with_shared_observer(observer: Option<PanicObserver>) -> Self {
        Self { observer }
    }
}

impl fmt::Debug for RecoveryMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryMiddleware")
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Middleware for RecoveryMiddleware {
    fn name(&self) -> &str {
        "recovery"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let observer = self.observer.clone();
        Arc::new(move |ctx, req| {
            let next = next.clone();
            let observer = observer.clone();
            async move {
                let model = req.model.clone();
                match call_catching(&next, ctx, req).await {
                    Ok(result) => result,
                    Err(payload) => {
                        let message = panic_message(&*payload);
                        error!(model = %model, panic = %message, "recovered from panic in llm call");
                        if let Some(observer) = &observer {
                            observer(&*payload);
                        }
                        Err(ResilienceError::panic_recovered(message))
                    }
                }
            }
            .boxed()
        })
    }
}
