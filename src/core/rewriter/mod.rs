//! Request rewriting
//!
//! Normalization applied once per call, before the middleware chain.

mod builtin;
mod chain;


pub use builtin::{DefaultModelRewriter, EmptyToolsCleaner};
pub use chain::{RequestRewriter, RewriterChain};
