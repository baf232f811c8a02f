//! Error handling for the resilience layer
//!
//! This module defines the crate-wide error type.

mod helpers;
mod types;

pub use types::{ResilienceError, Result};
