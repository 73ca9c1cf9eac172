//! Interactive terminal front-end for the workspace

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::client::DocumentsApi;
use crate::config::ClientConfig;
use crate::download::save_document;
use crate::error::Result;
use crate::ui::{create_spinner, UI};
use crate::upload::UploadOutcome;
use crate::workspace::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    Select,
    Refresh,
    Download,
    Quit,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Upload,
        Action::Select,
        Action::Refresh,
        Action::Download,
        Action::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::Upload => "Upload a PDF",
            Action::Select => "Select a document",
            Action::Refresh => "Refresh list",
            Action::Download => "Download selected document",
            Action::Quit => "Quit",
        }
    }
}

/// Menu loop over a mounted [`Workspace`]
pub struct WorkspaceSession<C: DocumentsApi> {
    client: Arc<C>,
    workspace: Workspace<C>,
    download_dir: PathBuf,
    ui: UI,
}

impl<C: DocumentsApi> WorkspaceSession<C> {
    pub fn new(client: Arc<C>, config: &ClientConfig, download_dir: PathBuf) -> Result<Self> {
        let workspace = Workspace::new(Arc::clone(&client), config)?;
        Ok(Self {
            client,
            workspace,
            download_dir,
            ui: UI::new(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let theme = ColorfulTheme::default();
        self.workspace.mount();

        loop {
            self.settle().await;
            self.show();

            let labels: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
            let choice = Select::with_theme(&theme)
                .with_prompt("What next?")
                .items(&labels)
                .default(0)
                .interact_opt()?;

            let action = choice.and_then(|i| Action::ALL.get(i).copied());
            match action {
                Some(Action::Upload) => self.upload(&theme).await?,
                Some(Action::Select) => self.select(&theme)?,
                Some(Action::Refresh) => self.workspace.reload(),
                Some(Action::Download) => self.download().await,
                Some(Action::Quit) | None => break,
            }
        }

        self.workspace.unmount();
        Ok(())
    }

    async fn settle(&mut self) {
        if self.workspace.catalog().pending_loads() == 0 {
            return;
        }
        let spinner = create_spinner("Loading documents...");
        self.workspace.settle().await;
        spinner.finish_and_clear();
    }

    fn show(&self) {
        self.ui.header("Documents");
        self.ui.catalog(&self.workspace.catalog_view());
        self.ui.separator();
        self.ui.preview(&self.workspace.preview_view());
        self.ui.upload_zone(&self.workspace.upload_view());
        self.ui.blank_line();
    }

    async fn upload(&mut self, theme: &ColorfulTheme) -> Result<()> {
        let path: String = Input::with_theme(theme)
            .with_prompt("Path to PDF")
            .allow_empty(true)
            .interact_text()?;
        let path = path.trim();
        if path.is_empty() {
            return Ok(());
        }

        let spinner = create_spinner("Uploading...");
        let outcome = self.workspace.upload_path(Path::new(path)).await;
        spinner.finish_and_clear();

        match outcome {
            UploadOutcome::Uploaded(document) => {
                self.ui.success(&format!("Uploaded {}", document.filename));
            }
            // The gate keeps the message; the upload zone shows it on the next redraw
            UploadOutcome::Rejected(_) | UploadOutcome::Failed(_) | UploadOutcome::Ignored => {}
        }
        Ok(())
    }

    fn select(&mut self, theme: &ColorfulTheme) -> Result<()> {
        let documents = &self.workspace.catalog().state().documents;
        if documents.is_empty() {
            self.ui.warning("Nothing to select yet.");
            return Ok(());
        }

        let names: Vec<String> = documents
            .iter()
            .map(|d| format!("{}  {}", d.filename, d.size_label()))
            .collect();
        let current = self
            .workspace
            .selected_document()
            .and_then(|selected| documents.iter().position(|d| d.id == selected.id))
            .unwrap_or(0);

        let choice = Select::with_theme(theme)
            .with_prompt("Document")
            .items(&names)
            .default(current)
            .interact_opt()?;

        if let Some(index) = choice {
            self.workspace.select_index(index);
        }
        Ok(())
    }

    async fn download(&self) {
        let Some(document) = self.workspace.selected_document() else {
            self.ui.warning("Select a document first.");
            return;
        };

        match save_document(&*self.client, &document.id, Some(document), &self.download_dir).await {
            Ok(path) => self.ui.success(&format!("Saved {}", path.display())),
            Err(e) => self.ui.error(&e.to_string()),
        }
    }
}
