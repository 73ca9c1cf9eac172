//! Unified error handling for the pdfdesk client and CLI
//!
//! Every error carries a stable code in the format `PXXX`:
//! - P2XX: Network and API errors
//! - P3XX: File and I/O errors
//! - P4XX: Configuration errors
//! - P5XX: Validation and input errors
//! - P7XX: Document errors
//! - P8XX: UI and interaction errors
//! - P9XX: Internal errors

use std::fmt;
use thiserror::Error;

/// Unified Result type for all pdfdesk operations
pub type Result<T> = std::result::Result<T, PdfdeskError>;

/// Error codes for pdfdesk operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Network (P2XX)
    /// P201: HTTP request failed
    HttpError,
    /// P202: Connection timeout
    ConnectionTimeout,
    /// P204: Connection refused
    ConnectionRefused,
    /// P205: API returned error response
    ApiError,
    /// P206: Invalid API response format
    InvalidResponse,

    // File/IO (P3XX)
    /// P301: File not found
    FileNotFound,
    /// P302: File read error
    FileReadError,
    /// P303: File write error
    FileWriteError,

    // Configuration (P4XX)
    /// P401: Configuration error
    ConfigError,
    /// P402: Invalid endpoint URL
    InvalidEndpoint,

    // Validation (P5XX)
    /// P501: Invalid input
    InvalidInput,
    /// P502: Validation failed
    ValidationFailed,
    /// P503: Unsupported file type
    UnsupportedFileType,

    // Documents (P7XX)
    /// P701: Upload failed
    UploadFailed,
    /// P702: Document not found
    DocumentNotFound,
    /// P703: Download failed
    DownloadFailed,
    /// P704: Page rendering failed
    RenderFailed,

    // UI (P8XX)
    /// P801: Dialog error
    DialogError,

    // Internal (P9XX)
    /// P901: Internal error
    InternalError,
    /// P902: Serialization error
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::HttpError => 201,
            ErrorCode::ConnectionTimeout => 202,
            ErrorCode::ConnectionRefused => 204,
            ErrorCode::ApiError => 205,
            ErrorCode::InvalidResponse => 206,

            ErrorCode::FileNotFound => 301,
            ErrorCode::FileReadError => 302,
            ErrorCode::FileWriteError => 303,

            ErrorCode::ConfigError => 401,
            ErrorCode::InvalidEndpoint => 402,

            ErrorCode::InvalidInput => 501,
            ErrorCode::ValidationFailed => 502,
            ErrorCode::UnsupportedFileType => 503,

            ErrorCode::UploadFailed => 701,
            ErrorCode::DocumentNotFound => 702,
            ErrorCode::DownloadFailed => 703,
            ErrorCode::RenderFailed => 704,

            ErrorCode::DialogError => 801,

            ErrorCode::InternalError => 901,
            ErrorCode::SerializationError => 902,
        }
    }

    /// Get the string code (e.g., "P201")
    pub fn as_str(&self) -> String {
        format!("P{}", self.code())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.code())
    }
}

/// Main error type for all pdfdesk operations
#[derive(Error, Debug)]
pub enum PdfdeskError {
    // ==================== Network Errors (P2XX) ====================
    /// HTTP/Network error
    #[error("[{code}] Network error: {message}")]
    Network {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// API error with status code
    #[error("[{code}] API error ({status}): {message}")]
    Api {
        code: ErrorCode,
        status: u16,
        message: String,
    },

    // ==================== File/IO Errors (P3XX) ====================
    /// File or IO error
    #[error("[{code}] {context}: {message}")]
    Io {
        code: ErrorCode,
        context: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // ==================== Configuration Errors (P4XX) ====================
    /// Configuration error
    #[error("[{code}] Configuration error: {message}")]
    Config {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<config::ConfigError>,
    },

    // ==================== Validation Errors (P5XX) ====================
    /// Validation error
    #[error("[{code}] Validation error: {message}")]
    Validation {
        code: ErrorCode,
        message: String,
        field: Option<String>,
    },

    /// Invalid input error
    #[error("[{code}] Invalid input: {message}")]
    InvalidInput { code: ErrorCode, message: String },

    // ==================== Document Errors (P7XX) ====================
    /// Document not found
    #[error("[{code}] Not found: {resource}")]
    NotFound { code: ErrorCode, resource: String },

    /// Upload error
    #[error("[{code}] Upload failed: {message}")]
    Upload { code: ErrorCode, message: String },

    /// Download error
    #[error("[{code}] Download failed: {message}")]
    Download { code: ErrorCode, message: String },

    /// Rendering capability error
    #[error("[{code}] Render failed: {message}")]
    Render { code: ErrorCode, message: String },

    // ==================== UI Errors (P8XX) ====================
    /// UI/Dialog error
    #[error("[{code}] UI error: {message}")]
    Ui { code: ErrorCode, message: String },

    // ==================== Internal Errors (P9XX) ====================
    /// Internal/Unexpected error
    #[error("[{code}] Internal error: {message}")]
    Internal { code: ErrorCode, message: String },

    /// JSON serialization error
    #[error("[{code}] Serialization error: {message}")]
    Serialization {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

// ==================== Constructor Methods ====================

impl PdfdeskError {
    // --- Network ---

    /// Create network error from message
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            code: ErrorCode::HttpError,
            message: message.into(),
            source: None,
        }
    }

    /// Create network error from reqwest error
    pub fn network_from_reqwest(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::ConnectionTimeout
        } else if err.is_connect() {
            ErrorCode::ConnectionRefused
        } else {
            ErrorCode::HttpError
        };

        Self::Network {
            code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code: ErrorCode::ApiError,
            status,
            message: message.into(),
        }
    }

    /// Create invalid response error
    pub fn invalid_response(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code: ErrorCode::InvalidResponse,
            status,
            message: message.into(),
        }
    }

    // --- File/IO ---

    /// Create IO error from std::io::Error
    pub fn io_from_error(context: impl Into<String>, err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::FileWriteError,
            _ => ErrorCode::FileReadError,
        };

        Self::Io {
            code,
            context: context.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::Io {
            code: ErrorCode::FileNotFound,
            context: "File not found".to_string(),
            message: path.into(),
            source: None,
        }
    }

    // --- Configuration ---

    /// Create configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::ConfigError,
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration error with source
    pub fn config_from_error(err: config::ConfigError) -> Self {
        Self::Config {
            code: ErrorCode::ConfigError,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create invalid endpoint error
    pub fn invalid_endpoint(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::InvalidEndpoint,
            message: message.into(),
            source: None,
        }
    }

    // --- Validation ---

    /// Create validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            field: None,
        }
    }

    /// Create validation error with field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create unsupported file type error
    pub fn unsupported_file_type(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::UnsupportedFileType,
            message: message.into(),
            field: Some("content_type".to_string()),
        }
    }

    /// Create invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            code: ErrorCode::InvalidInput,
            message: message.into(),
        }
    }

    // --- Documents ---

    /// Create document not found error
    pub fn document_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            code: ErrorCode::DocumentNotFound,
            resource: id.into(),
        }
    }

    /// Create upload error
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            code: ErrorCode::UploadFailed,
            message: message.into(),
        }
    }

    /// Create download error
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            code: ErrorCode::DownloadFailed,
            message: message.into(),
        }
    }

    /// Create render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            code: ErrorCode::RenderFailed,
            message: message.into(),
        }
    }

    // --- UI ---

    /// Create UI error
    pub fn ui(message: impl Into<String>) -> Self {
        Self::Ui {
            code: ErrorCode::DialogError,
            message: message.into(),
        }
    }

    // --- Internal ---

    /// Create internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            message: message.into(),
        }
    }

    // --- Utility Methods ---

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Network { code, .. } => *code,
            Self::Api { code, .. } => *code,
            Self::Io { code, .. } => *code,
            Self::Config { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::InvalidInput { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Upload { code, .. } => *code,
            Self::Download { code, .. } => *code,
            Self::Render { code, .. } => *code,
            Self::Ui { code, .. } => *code,
            Self::Internal { code, .. } => *code,
            Self::Serialization { code, .. } => *code,
        }
    }
}

// ==================== From Implementations ====================

impl From<std::io::Error> for PdfdeskError {
    fn from(err: std::io::Error) -> Self {
        Self::io_from_error("IO operation", err)
    }
}

impl From<reqwest::Error> for PdfdeskError {
    fn from(err: reqwest::Error) -> Self {
        Self::network_from_reqwest(err)
    }
}

impl From<serde_json::Error> for PdfdeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            code: ErrorCode::SerializationError,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<config::ConfigError> for PdfdeskError {
    fn from(err: config::ConfigError) -> Self {
        Self::config_from_error(err)
    }
}

impl From<dialoguer::Error> for PdfdeskError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Ui {
            code: ErrorCode::DialogError,
            message: format!("Dialog error: {}", err),
        }
    }
}

impl From<validator::ValidationErrors> for PdfdeskError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::validation(err.to_string())
    }
}

// Manual Clone implementation that drops non-cloneable sources
impl Clone for PdfdeskError {
    fn clone(&self) -> Self {
        match self {
            Self::Network { code, message, .. } => Self::Network {
                code: *code,
                message: message.clone(),
                source: None,
            },
            Self::Api {
                code,
                status,
                message,
            } => Self::Api {
                code: *code,
                status: *status,
                message: message.clone(),
            },
            Self::Io {
                code,
                context,
                message,
                ..
            } => Self::Io {
                code: *code,
                context: context.clone(),
                message: message.clone(),
                source: None,
            },
            Self::Config { code, message, .. } => Self::Config {
                code: *code,
                message: message.clone(),
                source: None,
            },
            Self::Validation {
                code,
                message,
                field,
            } => Self::Validation {
                code: *code,
                message: message.clone(),
                field: field.clone(),
            },
            Self::InvalidInput { code, message } => Self::InvalidInput {
                code: *code,
                message: message.clone(),
            },
            Self::NotFound { code, resource } => Self::NotFound {
                code: *code,
                resource: resource.clone(),
            },
            Self::Upload { code, message } => Self::Upload {
                code: *code,
                message: message.clone(),
            },
            Self::Download { code, message } => Self::Download {
                code: *code,
                message: message.clone(),
            },
            Self::Render { code, message } => Self::Render {
                code: *code,
                message: message.clone(),
            },
            Self::Ui { code, message } => Self::Ui {
                code: *code,
                message: message.clone(),
            },
            Self::Internal { code, message } => Self::Internal {
                code: *code,
                message: message.clone(),
            },
            Self::Serialization { code, message, .. } => Self::Serialization {
                code: *code,
                message: message.clone(),
                source: None,
            },
        }
    }
}
