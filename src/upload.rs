use std::path::Path;
use std::sync::Arc;

use validator::Validate;

use pdfdesk_protocol::api::{
    DocumentMetadata, ErrorDetail, UploadDocumentResponse, PDF_CONTENT_TYPE,
};

use crate::callback::Callback;
use crate::client::DocumentsApi;
use crate::error::{PdfdeskError, Result};
use crate::file::{FileInput, PdfFile};

pub const UNSUPPORTED_FILE_MESSAGE: &str = "Only PDF files are supported.";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed.";

const IDLE_PROMPT: &str = "Drop a PDF here or click to select";
const UPLOADING_PROMPT: &str = "Uploading...";

/// Local state of the upload gate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadState {
    pub error: Option<String>,
    pub is_dragging: bool,
    pub is_uploading: bool,
}

/// What the gate shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub prompt: &'static str,
    pub is_dragging: bool,
    pub disabled: bool,
    pub error: Option<String>,
}

/// Result of handing a file to the gate
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// No file was provided
    Ignored,
    /// Rejected locally, no request was made
    Rejected(String),
    /// The request failed; carries the message shown to the user
    Failed(String),
    Uploaded(DocumentMetadata),
}

/// Validates a picked or dropped file and uploads it
///
/// Both the drag-and-drop path and manual selection end up in the same
/// validate-then-upload routine. `&mut self` is held for the whole request,
/// so a second upload cannot start while one is running.
pub struct UploadGate<C: DocumentsApi> {
    client: Arc<C>,
    on_uploaded: Callback<DocumentMetadata>,
    state: UploadState,
    input: FileInput,
}

impl<C: DocumentsApi> UploadGate<C> {
    pub fn new(client: Arc<C>, on_uploaded: Callback<DocumentMetadata>) -> Self {
        Self {
            client,
            on_uploaded,
            state: UploadState::default(),
            input: FileInput::new(),
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn input(&self) -> &FileInput {
        &self.input
    }

    pub fn view(&self) -> UploadView {
        UploadView {
            prompt: if self.state.is_uploading {
                UPLOADING_PROMPT
            } else {
                IDLE_PROMPT
            },
            is_dragging: self.state.is_dragging,
            disabled: self.state.is_uploading,
            error: self.state.error.clone(),
        }
    }

    pub fn drag_enter(&mut self) {
        self.state.is_dragging = true;
    }

    pub fn drag_over(&mut self) {
        self.state.is_dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.state.is_dragging = false;
    }

    /// Drop handler; only the first dropped file is considered
    pub async fn drop_file(&mut self, file: Option<PdfFile>) -> UploadOutcome {
        self.state.is_dragging = false;

        match file {
            Some(file) => self.upload_file(file).await,
            None => UploadOutcome::Ignored,
        }
    }

    /// Manual selection handler; clears the input afterwards
    pub async fn select_file(&mut self, file: Option<PdfFile>) -> UploadOutcome {
        let Some(file) = file else {
            return UploadOutcome::Ignored;
        };

        let outcome = self.upload_file(file).await;
        self.input.reset();
        outcome
    }

    /// Manual selection of a file on disk
    pub async fn select_path(&mut self, path: &Path) -> UploadOutcome {
        self.input.set(path);

        match PdfFile::from_path(path).await {
            Ok(file) => self.select_file(Some(file)).await,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read selected file");
                self.state.error = Some(e.to_string());
                self.input.reset();
                UploadOutcome::Rejected(e.to_string())
            }
        }
    }

    async fn upload_file(&mut self, file: PdfFile) -> UploadOutcome {
        if file.content_type != PDF_CONTENT_TYPE {
            tracing::debug!(filename = %file.filename, content_type = %file.content_type, "rejected non-PDF file");
            self.state.error = Some(UNSUPPORTED_FILE_MESSAGE.to_string());
            return UploadOutcome::Rejected(UNSUPPORTED_FILE_MESSAGE.to_string());
        }

        self.state.is_uploading = true;
        self.state.error = None;

        let result = self.send(&file).await;

        self.state.is_uploading = false;

        match result {
            Ok(document) => {
                tracing::info!(id = %document.id, filename = %document.filename, "document uploaded");
                self.on_uploaded.call(document.clone());
                UploadOutcome::Uploaded(document)
            }
            Err(e) => {
                let message = user_message(&e);
                tracing::warn!(filename = %file.filename, error = %e, "upload failed");
                self.state.error = Some(message.clone());
                UploadOutcome::Failed(message)
            }
        }
    }

    async fn send(&self, file: &PdfFile) -> Result<DocumentMetadata> {
        let reply = self.client.upload_document(file).await?;

        if !reply.is_success() {
            let message = reply
                .json::<ErrorDetail>()
                .ok()
                .and_then(|body| body.detail)
                .filter(|detail| !detail.is_empty())
                .unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string());
            return Err(PdfdeskError::upload(message));
        }

        let document: UploadDocumentResponse = reply.json()?;
        document.validate()?;
        Ok(document)
    }
}

/// Text shown for a failed upload: the server's detail when it sent one
fn user_message(err: &PdfdeskError) -> String {
    match err {
        PdfdeskError::Upload { message, .. } => message.clone(),
        _ => UPLOAD_FAILED_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiReply;
    use crate::tests::mocks::MockDocumentsApi;
    use crate::tests::utils::test_helpers::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn pdf(name: &str) -> PdfFile {
        PdfFile::new(name, PDF_CONTENT_TYPE, MINIMAL_PDF)
    }

    fn gate_with_sink(
        client: Arc<MockDocumentsApi>,
    ) -> (UploadGate<MockDocumentsApi>, Arc<Mutex<Vec<DocumentMetadata>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let gate = UploadGate::new(
            client,
            Callback::new(move |doc| sink.lock().unwrap().push(doc)),
        );
        (gate, received)
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_without_request() {
        let client = Arc::new(MockDocumentsApi::new());
        let (mut gate, received) = gate_with_sink(client.clone());

        let outcome = gate
            .select_file(Some(PdfFile::new("notes.txt", "text/plain", "hello")))
            .await;

        assert!(matches!(outcome, UploadOutcome::Rejected(_)));
        assert_eq!(gate.state().error.as_deref(), Some(UNSUPPORTED_FILE_MESSAGE));
        assert!(client.get_requests().is_empty());
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_pdf_lookalike_content_types() {
        let client = Arc::new(MockDocumentsApi::new());
        let (mut gate, _) = gate_with_sink(client.clone());

        gate.drop_file(Some(PdfFile::new("a.pdf", "application/x-pdf", MINIMAL_PDF)))
            .await;
        gate.drop_file(Some(PdfFile::new("a.pdf", "", MINIMAL_PDF)))
            .await;

        assert_eq!(gate.state().error.as_deref(), Some(UNSUPPORTED_FILE_MESSAGE));
        assert!(client.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_success_invokes_callback_once() {
        let client = Arc::new(MockDocumentsApi::new());
        let created = sample_document("doc-1", "sample.pdf");
        client.add_json("/upload", 201, document_json(&created));
        let (mut gate, received) = gate_with_sink(client.clone());

        let outcome = gate.select_file(Some(pdf("sample.pdf"))).await;

        assert!(matches!(outcome, UploadOutcome::Uploaded(ref doc) if doc == &created));
        assert_eq!(received.lock().unwrap().as_slice(), &[created]);
        assert_eq!(client.request_count("/upload"), 1);
        assert_eq!(
            client.get_requests()[0].filename.as_deref(),
            Some("sample.pdf")
        );
        assert!(!gate.state().is_uploading);
        assert!(gate.state().error.is_none());
    }

    #[tokio::test]
    async fn test_failure_uses_server_detail() {
        let client = Arc::new(MockDocumentsApi::new());
        client.add_json("/upload", 413, json!({ "detail": "too large" }));
        let (mut gate, received) = gate_with_sink(client.clone());

        let outcome = gate.select_file(Some(pdf("big.pdf"))).await;

        assert!(matches!(outcome, UploadOutcome::Failed(ref m) if m == "too large"));
        assert_eq!(gate.state().error.as_deref(), Some("too large"));
        assert!(!gate.state().is_uploading);
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_without_parsable_body_falls_back() {
        let client = Arc::new(MockDocumentsApi::new());
        client.add_reply("/upload", ApiReply::new(500, "Internal Server Error"));
        let (mut gate, _) = gate_with_sink(client.clone());

        gate.select_file(Some(pdf("a.pdf"))).await;
        assert_eq!(gate.state().error.as_deref(), Some(UPLOAD_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_failure_with_non_string_detail_falls_back() {
        let client = Arc::new(MockDocumentsApi::new());
        client.add_json(
            "/upload",
            422,
            json!({ "detail": [{ "loc": ["body", "file"], "msg": "field required" }] }),
        );
        let (mut gate, _) = gate_with_sink(client.clone());

        gate.select_file(Some(pdf("a.pdf"))).await;
        assert_eq!(gate.state().error.as_deref(), Some(UPLOAD_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_transport_error_falls_back() {
        let client = Arc::new(MockDocumentsApi::new());
        client.add_error("/upload", PdfdeskError::network("connection refused"));
        let (mut gate, _) = gate_with_sink(client.clone());

        let outcome = gate.drop_file(Some(pdf("a.pdf"))).await;
        assert!(matches!(outcome, UploadOutcome::Failed(ref m) if m == UPLOAD_FAILED_MESSAGE));
        assert!(!gate.state().is_uploading);
    }

    #[tokio::test]
    async fn test_success_with_malformed_record_is_failure() {
        let client = Arc::new(MockDocumentsApi::new());
        client.add_json("/upload", 201, json!({ "id": "x" }));
        let (mut gate, received) = gate_with_sink(client.clone());

        gate.select_file(Some(pdf("a.pdf"))).await;
        assert_eq!(gate.state().error.as_deref(), Some(UPLOAD_FAILED_MESSAGE));
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_with_dot_id_is_failure() {
        let client = Arc::new(MockDocumentsApi::new());
        client.add_json("/upload", 201, document_json(&sample_document("..", "a.pdf")));
        let (mut gate, received) = gate_with_sink(client.clone());

        gate.select_file(Some(pdf("a.pdf"))).await;
        assert_eq!(gate.state().error.as_deref(), Some(UPLOAD_FAILED_MESSAGE));
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_attempt_clears_previous_error() {
        let client = Arc::new(MockDocumentsApi::new());
        client.add_json("/upload", 201, document_json(&sample_document("1", "a.pdf")));
        let (mut gate, _) = gate_with_sink(client.clone());

        gate.select_file(Some(PdfFile::new("a.txt", "text/plain", "x")))
            .await;
        assert!(gate.state().error.is_some());

        gate.select_file(Some(pdf("a.pdf"))).await;
        assert!(gate.state().error.is_none());
    }

    #[tokio::test]
    async fn test_manual_selection_resets_input() {
        let client = Arc::new(MockDocumentsApi::new());
        client.add_json("/upload", 201, document_json(&sample_document("1", "a.pdf")));
        let (mut gate, received) = gate_with_sink(client.clone());

        let dir = create_temp_dir();
        let path = create_temp_file_with_content(&dir, "a.pdf", MINIMAL_PDF);

        gate.select_path(&path).await;
        gate.select_path(&path).await;

        assert!(gate.input().value().is_none());
        assert_eq!(gate.input().reset_count(), 2);
        assert_eq!(client.request_count("/upload"), 2);
        assert_eq!(received.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_selection_is_ignored() {
        let client = Arc::new(MockDocumentsApi::new());
        let (mut gate, _) = gate_with_sink(client.clone());

        assert!(matches!(gate.select_file(None).await, UploadOutcome::Ignored));
        assert!(matches!(gate.drop_file(None).await, UploadOutcome::Ignored));
        assert!(client.get_requests().is_empty());
        assert!(gate.state().error.is_none());
    }

    #[tokio::test]
    async fn test_drag_state() {
        let client = Arc::new(MockDocumentsApi::new());
        let (mut gate, _) = gate_with_sink(client);

        gate.drag_enter();
        assert!(gate.view().is_dragging);
        gate.drag_leave();
        assert!(!gate.view().is_dragging);

        gate.drag_over();
        gate.drop_file(None).await;
        assert!(!gate.view().is_dragging);
        assert_eq!(gate.view().prompt, "Drop a PDF here or click to select");
        assert!(!gate.view().disabled);
    }
}
