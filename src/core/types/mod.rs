//! Core data types
//!
//! Request/response model and the error taxonomy.

pub mod chat;
pub mod errors;

pub use chat::{
    ChatChoice, ChatRequest, ChatResponse, ChatUsage, Message, Role, StreamChunk, ToolSchema,
};
pub use errors::{ClassifiedError, ErrorCode};
