//! Utility modules
//!
//! - **error**: Crate error type and classification helpers
//! - **logging**: Tracing subscriber setup

pub mod error;
pub mod logging;
