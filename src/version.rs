//! Version information

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");
