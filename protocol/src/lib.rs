//! Wire types for the pdfdesk document backend
//!
//! - `common`: domain records returned by the backend
//! - `api`: request/response bodies and endpoint paths

pub mod api;
pub mod common;
