//! Saving a document's PDF bytes to disk

use std::path::{Path, PathBuf};

use pdfdesk_protocol::api::DocumentMetadata;

use crate::client::DocumentsApi;
use crate::error::{PdfdeskError, Result};

/// Name to save a document under
///
/// Only the last path component of the stored filename is kept, so a
/// record named `../../etc/passwd` cannot write outside the target directory.
pub fn suggested_filename(id: &str, document: Option<&DocumentMetadata>) -> String {
    document
        .and_then(|d| Path::new(&d.filename).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}.pdf", id))
}

/// Fetch `/documents/{id}/pdf` and write it into `dir`
pub async fn save_document<C: DocumentsApi>(
    client: &C,
    id: &str,
    document: Option<&DocumentMetadata>,
    dir: &Path,
) -> Result<PathBuf> {
    let reply = client.fetch_pdf(id).await?;

    match reply.status {
        200..=299 => {}
        404 => return Err(PdfdeskError::document_not_found(id)),
        status => {
            return Err(PdfdeskError::download(format!(
                "Fetching document {} returned {}",
                id, status
            )))
        }
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PdfdeskError::io_from_error(dir.display().to_string(), e))?;

    let path = dir.join(suggested_filename(id, document));
    tokio::fs::write(&path, &reply.body)
        .await
        .map_err(|e| PdfdeskError::io_from_error(path.display().to_string(), e))?;

    tracing::debug!(path = %path.display(), size = reply.body.len(), "saved document");
    Ok(path)
}
