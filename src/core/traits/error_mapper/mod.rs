//! Error mapping traits and implementations
//!
//! This module converts HTTP responses and transport failures into the
//! classified error taxonomy.
//!
//! # Module Structure
//!
//! - `trait_def` - Core ErrorMapper trait definition
//! - `types` - Status-table mapper shared by all providers
//! - `body` - Error body message extraction
//! - `tests` - Test suite

pub mod body;
pub mod trait_def;
pub mod types;


pub use body::read_error_message;
pub use trait_def::ErrorMapper;
pub use types::{StatusErrorMapper, map_http_error};
