use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

mod cli;

use cli::CliHandler;
use pdfdesk::version::CURRENT_VERSION;

#[derive(Parser)]
#[command(
    name = "pdfdesk",
    about = "Upload, browse and preview PDF documents",
    long_about = "pdfdesk - terminal workspace for a PDF document store

OVERVIEW:
  Uploads PDF files to the document backend, lists what has been uploaded,
  and previews or downloads a selected document.

QUICK START:
  pdfdesk upload <FILE>                 # Upload a PDF
  pdfdesk list                          # List uploaded documents
  pdfdesk preview <ID> --render p1.png  # Render the first page
  pdfdesk download <ID>                 # Save the PDF locally
  pdfdesk workspace                     # Interactive session
  pdfdesk config set-endpoint <URL>     # Point at another backend",
    version = CURRENT_VERSION,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a PDF document
    Upload(UploadArgs),

    /// List uploaded documents
    #[command(aliases = &["ls"])]
    List,

    /// Show a document's preview and download link
    Preview(PreviewArgs),

    /// Save a document's PDF to disk
    Download(DownloadArgs),

    /// Interactive session: upload, select, refresh and download
    #[command(aliases = &["ws"])]
    Workspace(WorkspaceArgs),

    /// Configure settings
    #[command(aliases = &["cfg"])]
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct UploadArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct PreviewArgs {
    pub id: String,

    /// Render the first page to this PNG file
    #[arg(long, value_name = "OUT")]
    pub render: Option<PathBuf>,
}

#[derive(Args)]
pub struct DownloadArgs {
    pub id: String,

    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct WorkspaceArgs {
    /// Where downloads are saved
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    Show,
    SetEndpoint { url: String },
    SetBasePath { path: String },
    SetTimeout { seconds: u64 },
    SetVerbose { enabled: String },
    Reset,
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "pdfdesk=debug" } else { "pdfdesk=info" })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Installed before the config is read so its warnings reach stderr
    let (filter, filter_handle) = reload::Layer::new(log_filter(cli.verbose));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut handler = match CliHandler::new(cli.config).await {
        Ok(handler) => handler,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if handler.verbose() && !cli.verbose {
        if let Err(e) = filter_handle.reload(log_filter(true)) {
            tracing::warn!(error = %e, "could not raise log level");
        }
    }

    if let Err(e) = handler.execute(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
