//! Response caching

mod moka_cache;


pub use moka_cache::{MokaResponseCache, request_cache_key};
