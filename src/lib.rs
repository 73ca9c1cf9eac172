//! Terminal client for a PDF document store
//!
//! The workspace composes three components over an injected
//! [`DocumentsApi`](client::DocumentsApi): an upload gate, the document
//! catalog and a preview pane.

pub mod callback;
pub mod catalog;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod file;
pub mod preview;
pub mod render;
pub mod session;
pub mod ui;
pub mod upload;
pub mod version;
pub mod workspace;

#[cfg(test)]
mod tests;

pub use client::{DocumentsApi, HttpDocumentsApi};
pub use error::{PdfdeskError, Result};
pub use workspace::{Workspace, WorkspaceEvent};
