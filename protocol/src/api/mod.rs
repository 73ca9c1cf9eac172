//! API DTOs module
//!
//! Bodies and paths for the three backend endpoints:
//! list, upload, and fetch-by-id.

pub mod document;

pub use document::*;
