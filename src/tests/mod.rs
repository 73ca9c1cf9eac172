//! Shared test fixtures and mocks

pub mod utils;
