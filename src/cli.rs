use std::path::PathBuf;
use std::sync::Arc;

use pdfdesk::callback::Callback;
use pdfdesk::catalog::DocumentCatalog;
use pdfdesk::client::HttpDocumentsApi;
use pdfdesk::config::{default_config_path, AppConfig, ClientConfig, ConfigService};
use pdfdesk::download::save_document;
use pdfdesk::error::{PdfdeskError, Result};
use pdfdesk::file::PdfFile;
use pdfdesk::preview::PreviewPane;
use pdfdesk::render::PdftoppmRenderer;
use pdfdesk::session::WorkspaceSession;
use pdfdesk::ui::{create_spinner, document_rows, UI};
use pdfdesk::upload::{UploadGate, UploadOutcome};
use pdfdesk_protocol::api::DocumentMetadata;

use crate::{
    Commands, ConfigArgs, ConfigCommand, DownloadArgs, PreviewArgs, UploadArgs, WorkspaceArgs,
};

/// CLI handler for processing commands
pub struct CliHandler {
    config_path: Option<PathBuf>,
    app: AppConfig,
    ui: UI,
}

impl CliHandler {
    /// Load the persisted config, creating it with defaults if needed
    pub async fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let app = AppConfig::load(config_path.as_deref()).await?;
        Ok(Self {
            config_path,
            app,
            ui: UI::new(),
        })
    }

    pub fn verbose(&self) -> bool {
        self.app.verbose
    }

    fn config_file(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    /// Config file layered with `PDFDESK_*` overrides
    fn client_config(&self) -> Result<ClientConfig> {
        ClientConfig::builder().config_file(self.config_file()).build()
    }

    fn client(&self, config: &ClientConfig) -> Result<Arc<HttpDocumentsApi>> {
        Ok(Arc::new(HttpDocumentsApi::new(config.clone())?))
    }

    /// Execute a CLI command
    pub async fn execute(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Upload(args) => self.handle_upload(args).await,
            Commands::List => self.handle_list().await,
            Commands::Preview(args) => self.handle_preview(args).await,
            Commands::Download(args) => self.handle_download(args).await,
            Commands::Workspace(args) => self.handle_workspace(args).await,
            Commands::Config(args) => self.handle_config(args).await,
        }
    }

    async fn handle_upload(&mut self, args: UploadArgs) -> Result<()> {
        let file = PdfFile::from_path(&args.path).await?;
        let config = self.client_config()?;
        let mut gate = UploadGate::new(self.client(&config)?, Callback::noop());

        let spinner = create_spinner(&format!("Uploading {}...", file.filename));
        let outcome = gate.select_file(Some(file)).await;
        spinner.finish_and_clear();

        match outcome {
            UploadOutcome::Uploaded(document) => {
                self.ui.success("Upload complete");
                self.ui.card("Document", document_rows(&document));
                Ok(())
            }
            UploadOutcome::Rejected(message) => Err(PdfdeskError::unsupported_file_type(message)),
            UploadOutcome::Failed(message) => Err(PdfdeskError::upload(message)),
            UploadOutcome::Ignored => Ok(()),
        }
    }

    /// Mount a catalog and wait for its first load
    async fn loaded_catalog(
        &self,
        config: &ClientConfig,
    ) -> Result<DocumentCatalog<HttpDocumentsApi>> {
        let mut catalog = DocumentCatalog::new(self.client(config)?, Callback::noop());

        let spinner = create_spinner("Loading documents...");
        catalog.mount(0);
        catalog.settle().await;
        spinner.finish_and_clear();

        if let Some(message) = &catalog.state().error {
            return Err(PdfdeskError::network(message.clone()));
        }
        Ok(catalog)
    }

    async fn find_document(
        &self,
        config: &ClientConfig,
        id: &str,
    ) -> Result<Option<DocumentMetadata>> {
        let catalog = self.loaded_catalog(config).await?;
        Ok(catalog.state().documents.iter().find(|d| d.id == id).cloned())
    }

    async fn handle_list(&mut self) -> Result<()> {
        let config = self.client_config()?;
        let catalog = self.loaded_catalog(&config).await?;
        self.ui.catalog(&catalog.view());
        Ok(())
    }

    async fn handle_preview(&mut self, args: PreviewArgs) -> Result<()> {
        let config = self.client_config()?;
        let document = self
            .find_document(&config, &args.id)
            .await?
            .ok_or_else(|| PdfdeskError::document_not_found(&args.id))?;

        let mut pane = PreviewPane::new(&config)?;
        pane.set_document(Some(document));
        self.ui.preview(&pane.view());

        if let Some(output) = args.render {
            let renderer = PdftoppmRenderer::locate(config.timeout)?;
            let spinner = create_spinner("Rendering first page...");
            let rendered = pane.render_with(&renderer, &output).await;
            spinner.finish_and_clear();

            if let Some(page) = rendered? {
                self.ui.success(&format!(
                    "Rendered page {} to {}",
                    page.page_number,
                    page.path.display()
                ));
            }
        }
        Ok(())
    }

    async fn handle_download(&mut self, args: DownloadArgs) -> Result<()> {
        let config = self.client_config()?;

        // The list only supplies the suggested filename; fall back to `{id}.pdf`
        let document = match self.find_document(&config, &args.id).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "could not look up document name");
                None
            }
        };

        let dir = args.output.unwrap_or_else(|| PathBuf::from("."));
        let client = self.client(&config)?;
        let spinner = create_spinner("Downloading...");
        let saved = save_document(client.as_ref(), &args.id, document.as_ref(), &dir).await;
        spinner.finish_and_clear();

        let path = saved?;
        self.ui.success(&format!("Saved {}", path.display()));
        Ok(())
    }

    async fn handle_workspace(&mut self, args: WorkspaceArgs) -> Result<()> {
        let config = self.client_config()?;
        let dir = args.output.unwrap_or_else(|| PathBuf::from("."));
        let mut session = WorkspaceSession::new(self.client(&config)?, &config, dir)?;
        session.run().await
    }

    async fn handle_config(&mut self, args: ConfigArgs) -> Result<()> {
        let mut service = ConfigService::with_config_path(self.app.clone(), self.config_file());

        match args.command {
            ConfigCommand::Show => {
                self.ui.card("Configuration", service.show());
                return Ok(());
            }
            ConfigCommand::SetEndpoint { url } => {
                service.set_origin(&url).await?;
                self.ui.success(&format!("Endpoint set to {}", url));
            }
            ConfigCommand::SetBasePath { path } => {
                service.set_base_path(&path).await?;
                self.ui.success(&format!("Base path set to {}", path));
            }
            ConfigCommand::SetTimeout { seconds } => {
                service.set_timeout(seconds).await?;
                self.ui.success(&format!("Timeout set to {}s", seconds));
            }
            ConfigCommand::SetVerbose { enabled } => {
                service.set_verbose(&enabled).await?;
                self.ui
                    .success(&format!("Verbose set to {}", service.config().verbose));
            }
            ConfigCommand::Reset => {
                service.reset().await?;
                self.ui.success("Configuration reset to defaults");
            }
        }

        self.app = service.config().clone();
        Ok(())
    }
}
