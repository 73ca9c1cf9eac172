//! Test utilities and helpers for unit tests
//!
//! This module provides common testing utilities including:
//! - Temporary files and directories
//! - Document fixtures in the backend's JSON shape

#[cfg(test)]
pub mod test_helpers {
    use std::path::PathBuf;
    use tempfile::TempDir;

    use pdfdesk_protocol::common::{DocumentMetadata, PDF_CONTENT_TYPE};

    /// Smallest byte sequence the backend accepts as a PDF
    pub const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n";

    /// Create a temporary directory for testing
    pub fn create_temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    /// Create a temporary file with content
    pub fn create_temp_file_with_content(dir: &TempDir, filename: &str, content: &[u8]) -> PathBuf {
        let file_path = dir.path().join(filename);
        std::fs::write(&file_path, content).expect("Failed to write temp file");
        file_path
    }

    /// A document record as the backend would return it
    pub fn sample_document(id: &str, filename: &str) -> DocumentMetadata {
        DocumentMetadata {
            id: id.to_string(),
            filename: filename.to_string(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            size_bytes: 2048,
            uploaded_at: "2025-03-01T10:15:30Z".to_string(),
        }
    }

    pub fn document_json(document: &DocumentMetadata) -> serde_json::Value {
        serde_json::to_value(document).expect("Failed to serialize document")
    }

    pub fn documents_json(documents: &[DocumentMetadata]) -> serde_json::Value {
        serde_json::to_value(documents).expect("Failed to serialize documents")
    }
}
