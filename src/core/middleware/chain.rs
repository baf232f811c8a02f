//! Handler type, middleware trait and the composable chain

use crate::core::context::CallContext;
use crate::core::types::{ChatRequest, ChatResponse};
use crate::utils::error::Result;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A composed call: context and request in, response out
pub type Handler =
    Arc<dyn Fn(CallContext, ChatRequest) -> BoxFuture<'static, Result<ChatResponse>> + Send + Sync>;

/// Box an async closure into a [`Handler`]
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(CallContext, ChatRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ChatResponse>> + Send + 'static,
{
    Arc::new(move |ctx, req| Box::pin(f(ctx, req)))
}

/// A call-wrapping behavior
pub trait Middleware: Send + Sync {
    /// Name reported by [`MiddlewareChain::names`]
    fn name(&self) -> &str;

    /// Wrap `next`, returning the handler that runs this behavior around it
    fn wrap(&self, next: Handler) -> Handler;
}

/// Middleware built from a closure
pub struct FnMiddleware<F> {
    name: String,
    f: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Handler) -> Handler + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn wrap(&self, next: Handler) -> Handler {
        (self.f)(next)
    }
}

/// Turn a `Fn(Handler) -> Handler` closure into a named middleware
pub fn middleware_fn<F>(name: impl Into<String>, f: F) -> FnMiddleware<F>
where
    F: Fn(Handler) -> Handler + Send + Sync,
{
    FnMiddleware {
        name: name.into(),
        f,
    }
}

/// Ordered middleware pipeline
///
/// The first registered middleware is the outermost one. Registration takes the
/// write lock; [`then`](Self::then) only holds the read lock while folding, and
/// the handler it returns no longer touches the chain.
#[derive(Default)]
pub struct MiddlewareChain {
    middlewares: RwLock<Vec<Arc<dyn Middleware>>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append
    pub fn with<M: Middleware + 'static>(self, middleware: M) -> Self {
        self.use_middleware(middleware);
        self
    }

    /// Append: runs after (inside) every middleware already registered
    pub fn use_middleware<M: Middleware + 'static>(&self, middleware: M) {
        self.use_shared(Arc::new(middleware));
    }

    /// Append an already shared middleware
    pub fn use_shared(&self, middleware: Arc<dyn Middleware>) {
        self.middlewares.write().push(middleware);
    }

    /// Prepend: becomes the outermost middleware
    pub fn use_front<M: Middleware + 'static>(&self, middleware: M) {
        self.middlewares.write().insert(0, Arc::new(middleware));
    }

    /// Compose every middleware around `handler`
    pub fn then(&self, handler: Handler) -> Handler {
        self.middlewares
            .read()
            .iter()
            .rev()
            .fold(handler, |next, middleware| middleware.wrap(next))
    }

    pub fn len(&self) -> usize {
        self.middlewares.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.read().is_empty()
    }

    /// Registered names, outermost first
    pub fn names(&self) -> Vec<String> {
        self.middlewares
            .read()
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("middlewares", &self.names())
            .finish()
    }
}
