//! Outbound header injection middleware

use crate::core::middleware::chain::{Handler, Middleware};
use std::collections::HashMap;
use std::sync::Arc;

/// Merges fixed headers into every request; configured values win
#[derive(Debug, Clone, Default)]
pub struct HeadersMiddleware {
    headers: Arc<HashMap<String, String>>,
}

impl HeadersMiddleware {
    pub fn new(headers: HashMap<String, String>) -> Self {
        Self {
            headers: Arc::new(headers),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.headers).insert(name.into(), value.into());
        self
    }
}

impl Middleware for HeadersMiddleware {
    fn name(&self) -> &str {
        "headers"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let headers = self.headers.clone();
        Arc::new(move |ctx, mut req| {
            for (name, value) in headers.iter() {
                req.headers.insert(name.clone(), value.clone());
            }
            next(ctx, req)
        })
    }
}
