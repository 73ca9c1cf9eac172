//! Configuration management for the pdfdesk client and CLI

use config::{Config, Environment, File, FileFormat};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use pdfdesk_protocol::api::is_dot_segment;

use crate::error::{PdfdeskError, Result};

const DEFAULT_ORIGIN: &str = "http://127.0.0.1:3000";
const DEFAULT_BASE_PATH: &str = "/backend";
const DEFAULT_TIMEOUT: u64 = 30;

/// Persisted CLI settings, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub origin: String,
    pub base_path: String,
    pub timeout: u64,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Load the config file, writing defaults when it is missing or unreadable
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path(),
        };

        if config_file.exists() {
            let content = fs::read_to_string(&config_file).await?;

            match serde_json::from_str::<Self>(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    tracing::warn!(path = %config_file.display(), error = %e, "config file is invalid, rewriting defaults");
                    let config = Self::default();
                    config.save(&config_file).await?;
                    Ok(config)
                }
            }
        } else {
            let config = Self::default();
            config.save(&config_file).await?;
            Ok(config)
        }
    }

    pub async fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content).await?;
        Ok(())
    }
}

/// Backs the `config` subcommands
pub struct ConfigService {
    config: AppConfig,
    config_path: PathBuf,
}

impl ConfigService {
    pub fn with_config_path(config: AppConfig, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Rows for the `config show` card
    pub fn show(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Origin", self.config.origin.clone()),
            ("Base path", self.config.base_path.clone()),
            ("Timeout", format!("{}s", self.config.timeout)),
            ("Verbose", self.config.verbose.to_string()),
            ("Config file", self.config_path.display().to_string()),
        ]
    }

    pub async fn set_origin(&mut self, origin: &str) -> Result<()> {
        let candidate = AppConfig {
            origin: origin.trim_end_matches('/').to_string(),
            ..self.config.clone()
        };
        ClientConfig::from_app_config(&candidate).validate()?;
        self.config = candidate;
        self.config.save(&self.config_path).await
    }

    pub async fn set_base_path(&mut self, base_path: &str) -> Result<()> {
        let candidate = AppConfig {
            base_path: base_path.to_string(),
            ..self.config.clone()
        };
        ClientConfig::from_app_config(&candidate).validate()?;
        self.config = candidate;
        self.config.save(&self.config_path).await
    }

    pub async fn set_timeout(&mut self, seconds: u64) -> Result<()> {
        if seconds == 0 {
            return Err(PdfdeskError::validation_field(
                "Timeout must be at least one second",
                "timeout",
            ));
        }
        self.config.timeout = seconds;
        self.config.save(&self.config_path).await
    }

    pub async fn set_verbose(&mut self, value: &str) -> Result<()> {
        self.config.verbose = match value.to_lowercase().as_str() {
            "true" | "on" | "1" | "yes" => true,
            "false" | "off" | "0" | "no" => false,
            other => {
                return Err(PdfdeskError::invalid_input(format!(
                    "Expected true/false, got '{}'",
                    other
                )))
            }
        };
        self.config.save(&self.config_path).await
    }

    pub async fn reset(&mut self) -> Result<()> {
        self.config = AppConfig::default();
        self.config.save(&self.config_path).await
    }
}

pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdfdesk")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Connection settings for the document backend
///
/// `origin` is where the backend is served and `base_path` the prefix every
/// endpoint lives under, so the list endpoint resolves to
/// `{origin}{base_path}/documents`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    pub origin: String,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub use_proxy: Option<bool>,
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            base_path: default_base_path(),
            timeout: default_timeout(),
            use_proxy: None,
        }
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config_file: Option<PathBuf>,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        let config = ClientConfig::from_file_and_env(self.config_file.as_deref())?;
        config.validate()?;
        Ok(config)
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    pub fn from_app_config(app: &AppConfig) -> Self {
        Self {
            origin: app.origin.clone(),
            base_path: app.base_path.clone(),
            timeout: app.timeout,
            use_proxy: None,
        }
    }

    /// Layer defaults, the optional config file, then `PDFDESK_*` environment variables
    pub fn from_file_and_env<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("origin", DEFAULT_ORIGIN)?
            .set_default("base_path", DEFAULT_BASE_PATH)?
            .set_default("timeout", DEFAULT_TIMEOUT)?;

        // The file is always JSON, whatever its extension
        if let Some(config_path) = config_file {
            if config_path.as_ref().exists() {
                builder = builder
                    .add_source(File::from(config_path.as_ref()).format(FileFormat::Json));
            }
        }
        builder = builder.add_source(Environment::with_prefix("PDFDESK").try_parsing(true));

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.origin.is_empty() {
            return Err(PdfdeskError::invalid_endpoint("Origin cannot be empty"));
        }
        if !self.origin.starts_with("http://") && !self.origin.starts_with("https://") {
            return Err(PdfdeskError::invalid_endpoint(format!(
                "Origin must start with http:// or https://, got '{}'",
                self.origin
            )));
        }
        Url::parse(&self.origin)
            .map_err(|e| PdfdeskError::invalid_endpoint(format!("Invalid origin: {}", e)))?;
        if !self.base_path.starts_with('/') {
            return Err(PdfdeskError::invalid_endpoint(format!(
                "Base path must start with '/', got '{}'",
                self.base_path
            )));
        }
        Ok(())
    }

    /// Whether requests go through system proxies; off for loopback origins unless set
    pub fn proxy_enabled(&self) -> bool {
        self.use_proxy.unwrap_or_else(|| {
            !self.origin.contains("localhost") && !self.origin.contains("127.0.0.1")
        })
    }

    /// Absolute URL for a literal endpoint path such as `/documents`
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let segments: Vec<&str> = endpoint.split('/').filter(|s| !s.is_empty()).collect();
        self.segments_url(&segments)
    }

    /// Absolute URL built from individually percent-encoded path segments
    ///
    /// `.` and `..` are refused: URL parsing collapses them even when
    /// percent-encoded, so they would address a different endpoint.
    pub fn segments_url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(dot) = segments.iter().find(|s| is_dot_segment(s)) {
            return Err(PdfdeskError::invalid_input(format!(
                "'{}' cannot be used as a path segment",
                dot
            )));
        }

        let mut url = Url::parse(&self.origin)
            .map_err(|e| PdfdeskError::invalid_endpoint(format!("Invalid origin: {}", e)))?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                PdfdeskError::invalid_endpoint(format!("Origin cannot be a base: {}", self.origin))
            })?;
            path.pop_if_empty();
            path.extend(self.base_path.split('/').filter(|s| !s.is_empty()));
            path.extend(segments);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::test_helpers::create_temp_dir;

    fn local() -> ClientConfig {
        ClientConfig::default()
    }

    #[test]
    fn test_endpoint_url_joins_base_path() {
        let url = local().endpoint_url("/documents").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/backend/documents");
    }

    #[test]
    fn test_endpoint_url_tolerates_trailing_slashes() {
        let config = ClientConfig {
            origin: "https://docs.example.com/".to_string(),
            base_path: "/api/v1/".to_string(),
            ..local()
        };
        let url = config.endpoint_url("upload").unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/api/v1/upload");
    }

    #[test]
    fn test_segments_url_encodes_segments() {
        let config = local();
        let path = |segments: &[&str]| config.segments_url(segments).unwrap().path().to_string();
        assert_eq!(path(&["documents", "doc-1", "pdf"]), "/backend/documents/doc-1/pdf");
        assert_eq!(path(&["documents", "a/b", "pdf"]), "/backend/documents/a%2Fb/pdf");
        assert_eq!(path(&["documents", "...", "pdf"]), "/backend/documents/.../pdf");
    }

    #[test]
    fn test_segments_url_refuses_dot_segments() {
        let config = local();
        for id in [".", ".."] {
            let err = config.segments_url(&["documents", id, "pdf"]).unwrap_err();
            assert_eq!(err.code(), crate::error::ErrorCode::InvalidInput);
        }
    }

    #[test]
    fn test_validate() {
        assert!(local().validate().is_ok());

        let bad_scheme = ClientConfig {
            origin: "ftp://example.com".to_string(),
            ..local()
        };
        assert!(bad_scheme.validate().is_err());

        let bad_base = ClientConfig {
            base_path: "backend".to_string(),
            ..local()
        };
        assert!(bad_base.validate().is_err());
    }

    #[test]
    fn test_proxy_disabled_for_loopback() {
        assert!(!local().proxy_enabled());

        let remote = ClientConfig {
            origin: "https://docs.example.com".to_string(),
            ..local()
        };
        assert!(remote.proxy_enabled());

        let forced = ClientConfig {
            use_proxy: Some(true),
            ..local()
        };
        assert!(forced.proxy_enabled());
    }

    #[test]
    fn test_builder_reads_config_file() {
        let dir = create_temp_dir();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"origin":"http://localhost:8080","base_path":"/pdf","timeout":5,"verbose":true}"#,
        )
        .unwrap();

        let config = ClientConfig::builder().config_file(&path).build().unwrap();
        assert_eq!(config.origin, "http://localhost:8080");
        assert_eq!(config.base_path, "/pdf");
        assert_eq!(config.timeout, 5);
    }

    #[tokio::test]
    async fn test_builder_reads_json_without_json_extension() {
        let dir = create_temp_dir();
        let path = dir.path().join("pdfdesk.conf");

        let app = AppConfig::load(Some(&path)).await.unwrap();
        let mut service = ConfigService::with_config_path(app, path.clone());
        service.set_origin("http://localhost:8081").await.unwrap();

        let config = ClientConfig::builder().config_file(&path).build().unwrap();
        assert_eq!(config.origin, "http://localhost:8081");
        assert_eq!(config.base_path, "/backend");
    }

    #[tokio::test]
    async fn test_app_config_load_creates_defaults() {
        let dir = create_temp_dir();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_app_config_load_rewrites_invalid_file() {
        let dir = create_temp_dir();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let config = AppConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config, AppConfig::default());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("/backend"));
    }

    #[tokio::test]
    async fn test_config_service_setters() {
        let dir = create_temp_dir();
        let path = dir.path().join("config.json");
        let mut service = ConfigService::with_config_path(AppConfig::default(), path.clone());

        service.set_origin("http://localhost:9000/").await.unwrap();
        service.set_base_path("/files").await.unwrap();
        service.set_timeout(12).await.unwrap();
        service.set_verbose("on").await.unwrap();

        let reloaded = AppConfig::load(Some(&path)).await.unwrap();
        assert_eq!(reloaded.origin, "http://localhost:9000");
        assert_eq!(reloaded.base_path, "/files");
        assert_eq!(reloaded.timeout, 12);
        assert!(reloaded.verbose);

        assert!(service.set_timeout(0).await.is_err());
        assert!(service.set_origin("localhost").await.is_err());
        assert_eq!(service.config().origin, "http://localhost:9000");

        service.reset().await.unwrap();
        assert_eq!(service.config(), &AppConfig::default());
    }
}
