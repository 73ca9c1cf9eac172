//! Document records returned by the backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// MIME type of every document the backend accepts
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

// ============================================================================
// Document Structures
// ============================================================================

/// Metadata describing one uploaded PDF
///
/// Created by the backend when an upload succeeds and never modified
/// afterwards. `uploaded_at` is kept verbatim as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DocumentMetadata {
    #[validate(length(min = 1), custom(function = "validate_document_id"))]
    pub id: String,
    #[validate(length(min = 1))]
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: String,
}

/// `.` and `..` cannot stand as a URL path segment, so such ids are unreachable
fn validate_document_id(id: &str) -> Result<(), ValidationError> {
    if is_dot_segment(id) {
        return Err(ValidationError::new("dot_segment"));
    }
    Ok(())
}

/// True for `.` and `..`, which URL parsers collapse instead of encoding
pub fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

impl DocumentMetadata {
    /// Size in kilobytes with one decimal, e.g. `12.3 KB`
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.size_bytes as f64 / 1024.0)
    }

    /// Best-effort parse of `uploaded_at` as an RFC 3339 timestamp
    pub fn uploaded_at_parsed(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.uploaded_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_CONTENT_TYPE
    }
}
