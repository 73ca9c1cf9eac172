use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use pdfdesk_protocol::api::DocumentMetadata;

use crate::callback::Callback;
use crate::catalog::{CatalogView, DocumentCatalog, RefreshKey};
use crate::client::DocumentsApi;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::file::PdfFile;
use crate::preview::{PreviewPane, PreviewView};
use crate::upload::{UploadGate, UploadOutcome, UploadView};

/// Events children emit towards the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    Uploaded(DocumentMetadata),
    Selected(DocumentMetadata),
}

/// Root composition of the upload gate, catalog and preview
///
/// Owns the selection and the refresh counter. Children only report events
/// through their callbacks; the workspace applies them in [`dispatch`](Self::dispatch)
/// and pushes the new values back down.
pub struct Workspace<C: DocumentsApi> {
    refresh_key: RefreshKey,
    selected_document: Option<DocumentMetadata>,
    upload: UploadGate<C>,
    catalog: DocumentCatalog<C>,
    preview: PreviewPane,
    events: mpsc::UnboundedReceiver<WorkspaceEvent>,
}

impl<C: DocumentsApi> Workspace<C> {
    pub fn new(client: Arc<C>, config: &ClientConfig) -> Result<Self> {
        let (sender, events) = mpsc::unbounded_channel();

        let uploaded = sender.clone();
        let upload = UploadGate::new(
            Arc::clone(&client),
            Callback::new(move |document| {
                let _ = uploaded.send(WorkspaceEvent::Uploaded(document));
            }),
        );

        let catalog = DocumentCatalog::new(
            client,
            Callback::new(move |document| {
                let _ = sender.send(WorkspaceEvent::Selected(document));
            }),
        );

        Ok(Self {
            refresh_key: 0,
            selected_document: None,
            upload,
            catalog,
            preview: PreviewPane::new(config)?,
            events,
        })
    }

    pub fn refresh_key(&self) -> RefreshKey {
        self.refresh_key
    }

    pub fn selected_document(&self) -> Option<&DocumentMetadata> {
        self.selected_document.as_ref()
    }

    pub fn catalog(&self) -> &DocumentCatalog<C> {
        &self.catalog
    }

    pub fn upload_gate(&self) -> &UploadGate<C> {
        &self.upload
    }

    pub fn preview(&self) -> &PreviewPane {
        &self.preview
    }

    pub fn mount(&mut self) {
        self.catalog.set_selected_id(self.selected_id());
        self.catalog.mount(self.refresh_key);
    }

    pub fn unmount(&mut self) {
        self.catalog.unmount();
    }

    /// Wait for the catalog's pending loads
    pub async fn settle(&mut self) {
        self.catalog.settle().await;
    }

    /// Ask the catalog to fetch again without changing the selection
    pub fn reload(&mut self) {
        self.refresh_key += 1;
        self.catalog.set_refresh_key(self.refresh_key);
    }

    /// Upload a file picked from disk
    pub async fn upload_path(&mut self, path: &Path) -> UploadOutcome {
        let outcome = self.upload.select_path(path).await;
        self.dispatch();
        outcome
    }

    /// Upload a dropped file
    pub async fn drop_file(&mut self, file: Option<PdfFile>) -> UploadOutcome {
        let outcome = self.upload.drop_file(file).await;
        self.dispatch();
        outcome
    }

    /// Activate a catalog entry by id
    pub fn select(&mut self, id: &str) -> bool {
        let found = self.catalog.activate(id);
        self.dispatch();
        found
    }

    /// Activate a catalog entry by position
    pub fn select_index(&mut self, index: usize) -> bool {
        let found = self.catalog.activate_index(index);
        self.dispatch();
        found
    }

    pub fn set_selected_document(&mut self, document: Option<DocumentMetadata>) {
        self.selected_document = document;
        self.catalog.set_selected_id(self.selected_id());
        self.preview.set_document(self.selected_document.clone());
    }

    /// Apply every queued child event; returns how many were handled
    pub fn dispatch(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            handled += 1;
        }
        handled
    }

    fn apply(&mut self, event: WorkspaceEvent) {
        match event {
            WorkspaceEvent::Uploaded(document) => {
                tracing::debug!(id = %document.id, "selecting uploaded document");
                self.set_selected_document(Some(document));
                self.reload();
            }
            WorkspaceEvent::Selected(document) => {
                self.set_selected_document(Some(document));
            }
        }
    }

    pub fn upload_view(&self) -> UploadView {
        self.upload.view()
    }

    pub fn catalog_view(&self) -> CatalogView<'_> {
        self.catalog.view()
    }

    pub fn preview_view(&self) -> PreviewView {
        self.preview.view()
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_document.as_ref().map(|d| d.id.clone())
    }
}
