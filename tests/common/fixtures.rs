//! Test fixtures and data factories
//!
//! Provides factory methods for creating test data with sensible defaults.

use llm_resilience::core::traits::map_http_error;
use llm_resilience::{ChatRequest, Message, ResilienceError, ToolSchema};

/// Factory for creating chat requests
pub struct ChatRequestFactory;

impl ChatRequestFactory {
    /// A one-message request for `gpt-4`
    pub fn simple() -> ChatRequest {
        ChatRequest::new("gpt-4", vec![Message::user("Hello")])
    }

    /// Create a request for a specific model
    pub fn with_model(model: &str) -> ChatRequest {
        ChatRequest::new(model, vec![Message::user("Hello")])
    }

    /// A request carrying a tool-choice directive and the given tools
    pub fn with_tool_choice(choice: &str, tools: &[&str]) -> ChatRequest {
        let mut req = Self::simple();
        req.tool_choice = Some(choice.to_string());
        req.tools = tools
            .iter()
            .map(|name| ToolSchema {
                name: name.to_string(),
                description: format!("{} tool", name),
                parameters: serde_json::json!({"type": "object"}),
            })
            .collect();
        req
    }
}

/// Factory for classified upstream errors
pub struct ErrorFactory;

impl ErrorFactory {
    /// Error an upstream answering `status` would produce
    pub fn from_status(status: u16, message: &str) -> ResilienceError {
        map_http_error(status, message, "test").into()
    }

    /// Retryable 503
    pub fn transient() -> ResilienceError {
        Self::from_status(503, "service unavailable")
    }

    /// Non-retryable 401
    pub fn unauthorized() -> ResilienceError {
        Self::from_status(401, "invalid api key")
    }
}
