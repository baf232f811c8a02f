//! Integration tests for llm-resilience
//!
//! These tests verify the interaction between the breaker, the middleware
//! chain and the rewriters as assembled by `ResilientProvider`.

pub mod breaker_tests;
pub mod config_tests;
pub mod resilient_provider_tests;
