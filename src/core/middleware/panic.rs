//! Panic capture shared by the retry and recovery middlewares

use super::chain::Handler;
use crate::core::context::CallContext;
use crate::core::types::{ChatRequest, ChatResponse};
use crate::utils::error::Result;
use futures::FutureExt;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Invoke `next`, catching a panic raised while building or polling its future
pub(crate) async fn call_catching(
    next: &Handler,
    ctx: CallContext,
    req: ChatRequest,
) -> std::thread::Result<Result<ChatResponse>> {
    match panic::catch_unwind(AssertUnwindSafe(|| next(ctx, req))) {
        Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
        Err(payload) => Err(payload),
    }
}

/// Human readable message of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
