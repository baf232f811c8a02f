//! Request validation middleware and built-in validators

use crate::core::middleware::chain::{Handler, Middleware};
use crate::core::traits::RequestValidator;
use crate::core::types::{ChatRequest, ChatResponse};
use crate::utils::error::{ResilienceError, Result};
use futures::FutureExt;
use std::sync::Arc;

/// Rejects a request before dispatch if any validator fails
#[derive(Clone, Default)]
pub struct ValidatorMiddleware {
    validators: Arc<Vec<Arc<dyn RequestValidator>>>,
}

impl ValidatorMiddleware {
    pub fn new(validators: Vec<Arc<dyn RequestValidator>>) -> Self {
        Self {
            validators: Arc::new(validators),
        }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Middleware for ValidatorMiddleware {
    fn name(&self) -> &str {
        "validator"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let validators = self.validators.clone();
        Arc::new(move |ctx, req| {
            if let Err(e) = validators.iter().try_for_each(|v| v.validate(&req)) {
                return futures::future::ready(Err::<ChatResponse, _>(e)).boxed();
            }
            next(ctx, req)
        })
    }
}

/// Requires a non-empty model name
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireModel;

impl RequestValidator for RequireModel {
    fn validate(&self, req: &ChatRequest) -> Result<()> {
        if req.model.trim().is_empty() {
            return Err(ResilienceError::validation("model is required"));
        }
        Ok(())
    }
}

/// Requires at least one message
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireMessages;

impl RequestValidator for RequireMessages {
    fn validate(&self, req: &ChatRequest) -> Result<()> {
        if req.messages.is_empty() {
            return Err(ResilienceError::validation("at least one message is required"));
        }
        Ok(())
    }
}

/// Caps `max_tokens`
#[derive(Debug, Clone, Copy)]
pub struct MaxTokensLimit {
    pub max: u32,
}

impl MaxTokensLimit {
    pub fn new(max: u32) -> Self {
        Self { max }
    }
}

impl RequestValidator for MaxTokensLimit {
    fn validate(&self, req: &ChatRequest) -> Result<()> {
        match req.max_tokens {
            Some(requested) if requested > self.max => Err(ResilienceError::validation(format!(
                "max_tokens {} exceeds limit {}",
                requested, self.max
            ))),
            _ => Ok(()),
        }
    }
}
