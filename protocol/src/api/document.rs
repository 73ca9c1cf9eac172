//! Document API DTOs
//!
//! Endpoint paths are relative to the backend base path (`/backend` by
//! default on the client side).

use serde::{Deserialize, Serialize};

pub use crate::common::{is_dot_segment, DocumentMetadata, PDF_CONTENT_TYPE};

// ============================================================================
// Endpoints
// ============================================================================

/// GET, returns `Vec<DocumentMetadata>`
pub const DOCUMENTS_PATH: &str = "/documents";

/// POST multipart, returns the created `DocumentMetadata`
pub const UPLOAD_PATH: &str = "/upload";

/// Name of the multipart form field carrying the file
pub const UPLOAD_FIELD: &str = "file";

/// Path segments of the raw PDF endpoint: `/documents/{id}/pdf`
pub fn document_pdf_segments(id: &str) -> [&str; 3] {
    ["documents", id, "pdf"]
}

// ============================================================================
// Response Bodies
// ============================================================================

/// List documents response
pub type ListDocumentsResponse = Vec<DocumentMetadata>;

/// Upload response
pub type UploadDocumentResponse = DocumentMetadata;

/// Error body the backend sends with non-2xx statuses
///
/// Example: `{ "detail": "Only PDF uploads are supported." }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<String>,
}
