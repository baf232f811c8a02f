//! Request/response transformation middleware

use crate::core::middleware::chain::{Handler, Middleware};
use crate::core::types::{ChatRequest, ChatResponse};
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;

pub type RequestTransform = Arc<dyn Fn(ChatRequest) -> ChatRequest + Send + Sync>;
pub type ResponseTransform = Arc<dyn Fn(ChatResponse) -> ChatResponse + Send + Sync>;

/// Rewrites the request before `next` and the response after a success
#[derive(Clone, Default)]
pub struct TransformMiddleware {
    request: Option<RequestTransform>,
    response: Option<ResponseTransform>,
}

impl TransformMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_request<F>(mut self, f: F) -> Self
    where
        F: Fn(ChatRequest) -> ChatRequest + Send + Sync + 'static,
    {
        self.request = Some(Arc::new(f));
        self
    }

    pub fn map_response<F>(mut self, f: F) -> Self
    where
        F: Fn(ChatResponse) -> ChatResponse + Send + Sync + 'static,
    {
        self.response = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for TransformMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformMiddleware")
            .field("request", &self.request.is_some())
            .field("response", &self.response.is_some())
            .finish()
    }
}

impl Middleware for TransformMiddleware {
    fn name(&self) -> &str {
        "transform"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let request = self.request.clone();
        let response = self.response.clone();
        Arc::new(move |ctx, req| {
            let req = match &request {
                Some(transform) => transform(req),
                None => req,
            };
            let fut = next(ctx, req);
            match response.clone() {
                Some(transform) => fut.map(move |result| result.map(|resp| transform(resp))).boxed(),
                None => fut,
            }
        })
    }
}
