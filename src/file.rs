//! Local files handed to the upload gate

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{PdfdeskError, Result};

/// A file picked by the user, ready to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub filename: String,
    /// MIME type as reported for the file, not sniffed from its bytes
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PdfdeskError::file_not_found(path.display().to_string()));
        }

        let bytes = fs::read(path)
            .await
            .map_err(|e| PdfdeskError::io_from_error(format!("Reading {}", path.display()), e))?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            filename,
            content_type: guess_content_type(path),
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// MIME type for a path, `application/octet-stream` when unknown
pub fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// The manual-selection input of the upload gate
///
/// Holds the last chosen path until it is reset; resetting after each
/// selection lets the same file be chosen again.
#[derive(Debug, Default)]
pub struct FileInput {
    value: Option<PathBuf>,
    resets: u32,
}

impl FileInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<PathBuf>) {
        self.value = Some(path.into());
    }

    pub fn value(&self) -> Option<&Path> {
        self.value.as_deref()
    }

    pub fn reset(&mut self) {
        self.value = None;
        self.resets += 1;
    }

    /// Number of times the input has been cleared
    pub fn reset_count(&self) -> u32 {
        self.resets
    }
}
