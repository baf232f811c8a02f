//! Built-in rewriters

use super::chain::RequestRewriter;
use crate::core::context::CallContext;
use crate::core::types::ChatRequest;
use crate::utils::error::Result;

/// Clears `tool_choice` when no tools are declared
///
/// Several upstreams reject a tool-choice directive without tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyToolsCleaner;

impl RequestRewriter for EmptyToolsCleaner {
    fn name(&self) -> &str {
        "empty_tools_cleaner"
    }

    fn rewrite(&self, _ctx: &CallContext, mut req: ChatRequest) -> Result<ChatRequest> {
        if req.tools.is_empty() {
            req.tool_choice = None;
        }
        Ok(req)
    }
}

/// Fills an empty model with the provider's default
#[derive(Debug, Clone)]
pub struct DefaultModelRewriter {
    model: String,
}

impl DefaultModelRewriter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl RequestRewriter for DefaultModelRewriter {
    fn name(&self) -> &str {
        "default_model"
    }

    fn rewrite(&self, _ctx: &CallContext, mut req: ChatRequest) -> Result<ChatRequest> {
        if req.model.trim().is_empty() {
            req.model = self.model.clone();
        }
        Ok(req)
    }
}
