use std::future::Future;
use std::path::{Path, PathBuf};

use reqwest::Url;

use pdfdesk_protocol::api::{document_pdf_segments, is_dot_segment, DocumentMetadata};

use crate::config::ClientConfig;
use crate::error::{PdfdeskError, Result};

pub const PLACEHOLDER_MESSAGE: &str = "Select a document to preview it.";
pub const DOWNLOAD_LABEL: &str = "Re-download PDF";
pub const LOADING_PDF_MESSAGE: &str = "Loading PDF...";

/// Anchor offering the PDF under its original name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    /// Origin-relative, e.g. `/backend/documents/doc-1/pdf`
    pub href: String,
    /// Suggested name for the saved file
    pub filename: String,
    pub label: &'static str,
}

/// What the external rendering capability is asked to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Absolute URL of the PDF byte stream
    pub source: String,
    pub page_number: u32,
    pub render_text_layer: bool,
    pub render_annotation_layer: bool,
    pub loading_placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPreview {
    pub title: String,
    pub download: DownloadLink,
    pub render: RenderRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewView {
    Placeholder(&'static str),
    Document(DocumentPreview),
}

/// A rendered page written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub page_number: u32,
    pub path: PathBuf,
}

/// External capability that turns a PDF byte stream into a page image
pub trait PageRenderer: Send + Sync {
    fn render(
        &self,
        request: &RenderRequest,
        output: &Path,
    ) -> impl Future<Output = Result<RenderedPage>> + Send;
}

/// Shows the selected document's first page and a download link
///
/// Only derives URLs; fetching and drawing the bytes is left to a
/// [`PageRenderer`]. Nothing is retried here.
#[derive(Debug, Clone)]
pub struct PreviewPane {
    base: Url,
    document: Option<DocumentMetadata>,
}

impl PreviewPane {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base = config.segments_url(&[])?;
        if base.cannot_be_a_base() {
            return Err(PdfdeskError::invalid_endpoint(format!(
                "Cannot build document links from {}",
                base
            )));
        }

        Ok(Self {
            base,
            document: None,
        })
    }

    pub fn document(&self) -> Option<&DocumentMetadata> {
        self.document.as_ref()
    }

    pub fn set_document(&mut self, document: Option<DocumentMetadata>) {
        self.document = document;
    }

    /// Absolute URL of `{base}/documents/{id}/pdf`
    ///
    /// Fails for the ids `.` and `..`, which a URL would collapse into a
    /// different path.
    pub fn document_url(&self, id: &str) -> Result<Url> {
        if is_dot_segment(id) {
            return Err(PdfdeskError::invalid_input(format!(
                "Document id '{}' cannot be addressed",
                id
            )));
        }

        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(document_pdf_segments(id));
        }
        Ok(url)
    }

    /// Origin-relative form of [`document_url`](Self::document_url)
    pub fn document_href(&self, id: &str) -> Result<String> {
        Ok(self.document_url(id)?.path().to_string())
    }

    pub fn view(&self) -> PreviewView {
        let Some(document) = &self.document else {
            return PreviewView::Placeholder(PLACEHOLDER_MESSAGE);
        };

        let url = match self.document_url(&document.id) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(id = %document.id, error = %e, "no preview for document");
                return PreviewView::Placeholder(PLACEHOLDER_MESSAGE);
            }
        };

        PreviewView::Document(DocumentPreview {
            title: document.filename.clone(),
            download: DownloadLink {
                href: url.path().to_string(),
                filename: document.filename.clone(),
                label: DOWNLOAD_LABEL,
            },
            render: RenderRequest {
                source: url.to_string(),
                page_number: 1,
                render_text_layer: false,
                render_annotation_layer: false,
                loading_placeholder: LOADING_PDF_MESSAGE,
            },
        })
    }

    /// Hand the current document to the renderer; `None` when nothing is selected
    pub async fn render_with<R: PageRenderer>(
        &self,
        renderer: &R,
        output: &Path,
    ) -> Result<Option<RenderedPage>> {
        match self.view() {
            PreviewView::Placeholder(_) => Ok(None),
            PreviewView::Document(preview) => {
                tracing::debug!(source = %preview.render.source, "rendering first page");
                renderer.render(&preview.render, output).await.map(Some)
            }
        }
    }
}
