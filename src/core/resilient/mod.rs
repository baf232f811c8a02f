//! Resilient provider
//!
//! The single integration point callers use instead of a raw provider.

mod builder;
mod provider;


pub use builder::ResilientProviderBuilder;
pub use provider::ResilientProvider;
