use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use pdfdesk_protocol::api::{DocumentMetadata, ListDocumentsResponse};

use crate::callback::Callback;
use crate::client::DocumentsApi;
use crate::error::{PdfdeskError, Result};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load documents.";
pub const EMPTY_MESSAGE: &str = "No documents uploaded yet.";
pub const LOADING_MESSAGE: &str = "Loading...";

/// Opaque reload signal; any change triggers a fetch
pub type RefreshKey = u64;

/// Local state of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogState {
    pub documents: Vec<DocumentMetadata>,
    pub error: Option<String>,
    pub is_loading: bool,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            error: None,
            is_loading: true,
        }
    }
}

/// What the catalog shows, in precedence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogView<'a> {
    Loading,
    Error(&'a str),
    Empty,
    List(Vec<CatalogEntry<'a>>),
}

/// One selectable row of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry<'a> {
    pub document: &'a DocumentMetadata,
    pub selected: bool,
}

struct LoadCycle {
    token: CancellationToken,
    task: JoinHandle<Result<Vec<DocumentMetadata>>>,
}

/// Lists the uploaded documents and reloads whenever the refresh key changes
///
/// Each load runs as its own task guarded by a cancellation token. Starting
/// a new load or unmounting cancels the previous token, and a cancelled
/// load never touches the state. The request itself is not aborted.
pub struct DocumentCatalog<C: DocumentsApi> {
    client: Arc<C>,
    on_select: Callback<DocumentMetadata>,
    selected_id: Option<String>,
    refresh_key: Option<RefreshKey>,
    mounted: bool,
    state: CatalogState,
    current: Option<CancellationToken>,
    in_flight: Vec<LoadCycle>,
}

impl<C: DocumentsApi> DocumentCatalog<C> {
    pub fn new(client: Arc<C>, on_select: Callback<DocumentMetadata>) -> Self {
        Self {
            client,
            on_select,
            selected_id: None,
            refresh_key: None,
            mounted: false,
            state: CatalogState::default(),
            current: None,
            in_flight: Vec::new(),
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// Loads started but not yet settled, including superseded ones
    pub fn pending_loads(&self) -> usize {
        self.in_flight.len()
    }

    /// Start the component and issue the first load
    pub fn mount(&mut self, refresh_key: RefreshKey) {
        if self.mounted {
            self.set_refresh_key(refresh_key);
            return;
        }

        self.mounted = true;
        self.refresh_key = Some(refresh_key);
        self.start_load();
    }

    /// Tear down; any load still in flight is dropped when it resolves
    pub fn unmount(&mut self) {
        self.mounted = false;
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Returns whether a load was started
    pub fn set_refresh_key(&mut self, refresh_key: RefreshKey) -> bool {
        if self.refresh_key == Some(refresh_key) {
            return false;
        }

        self.refresh_key = Some(refresh_key);
        if !self.mounted {
            return false;
        }

        self.start_load();
        true
    }

    pub fn set_selected_id(&mut self, selected_id: Option<String>) {
        self.selected_id = selected_id;
    }

    fn start_load(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }

        self.state.is_loading = true;
        self.state.error = None;

        let token = CancellationToken::new();
        let client = Arc::clone(&self.client);
        let task = tokio::spawn(async move { fetch_documents(client.as_ref()).await });

        tracing::debug!(refresh_key = ?self.refresh_key, "loading documents");

        self.in_flight.push(LoadCycle {
            token: token.clone(),
            task,
        });
        self.current = Some(token);
    }

    /// Wait for every load in flight and apply the ones still current
    pub async fn settle(&mut self) {
        for cycle in std::mem::take(&mut self.in_flight) {
            let result = match cycle.task.await {
                Ok(result) => result,
                Err(e) => Err(PdfdeskError::internal(format!(
                    "Document list task failed: {}",
                    e
                ))),
            };
            self.apply(&cycle.token, result);
        }
    }

    fn apply(&mut self, token: &CancellationToken, result: Result<Vec<DocumentMetadata>>) {
        if token.is_cancelled() {
            tracing::debug!("dropping superseded document list");
            return;
        }

        match result {
            Ok(documents) => {
                tracing::debug!(count = documents.len(), "documents loaded");
                self.state.documents = documents;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load documents");
                self.state.error = Some(LOAD_FAILED_MESSAGE.to_string());
                self.state.documents.clear();
            }
        }
        self.state.is_loading = false;
    }

    pub fn view(&self) -> CatalogView<'_> {
        if self.state.is_loading {
            return CatalogView::Loading;
        }
        if let Some(error) = &self.state.error {
            return CatalogView::Error(error);
        }
        if self.state.documents.is_empty() {
            return CatalogView::Empty;
        }

        CatalogView::List(
            self.state
                .documents
                .iter()
                .map(|document| CatalogEntry {
                    document,
                    selected: self.selected_id.as_deref() == Some(document.id.as_str()),
                })
                .collect(),
        )
    }

    /// Select the entry with this id; false if it is not listed
    pub fn activate(&self, id: &str) -> bool {
        match self.state.documents.iter().find(|d| d.id == id) {
            Some(document) => {
                self.on_select.call(document.clone());
                true
            }
            None => false,
        }
    }

    /// Select the entry at this position; false if out of range
    pub fn activate_index(&self, index: usize) -> bool {
        match self.state.documents.get(index) {
            Some(document) => {
                self.on_select.call(document.clone());
                true
            }
            None => false,
        }
    }
}

async fn fetch_documents<C: DocumentsApi>(client: &C) -> Result<Vec<DocumentMetadata>> {
    let reply = client.list_documents().await?;

    if !reply.is_success() {
        return Err(PdfdeskError::api(reply.status, LOAD_FAILED_MESSAGE));
    }

    let documents: ListDocumentsResponse = reply.json()?;

    // A record without a usable id or filename cannot be previewed or fetched again
    Ok(documents
        .into_iter()
        .filter(|document| match document.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(id = %document.id, error = %e, "skipping invalid document record");
                false
            }
        })
        .collect())
}
