//! HTTP client capability for the document backend
//!
//! Components never reach for a global fetch function; they receive a
//! [`DocumentsApi`] implementation and interpret the raw replies themselves.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;

use pdfdesk_protocol::api::{document_pdf_segments, DOCUMENTS_PATH, UPLOAD_FIELD, UPLOAD_PATH};

use crate::config::ClientConfig;
use crate::error::{PdfdeskError, Result};
use crate::file::PdfFile;

/// Raw backend reply: status code and body bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Build a reply with a JSON body
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            PdfdeskError::invalid_response(self.status, format!("Invalid JSON body: {}", e))
        })
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Backend operations used by the workspace components
///
/// Every method resolves to the raw reply for any HTTP status; `Err` is
/// reserved for transport failures.
pub trait DocumentsApi: Send + Sync + 'static {
    /// GET `/documents`, bypassing caches
    fn list_documents(&self) -> impl Future<Output = Result<ApiReply>> + Send;

    /// POST `/upload` as multipart with the file under field `file`
    fn upload_document(&self, file: &PdfFile) -> impl Future<Output = Result<ApiReply>> + Send;

    /// GET `/documents/{id}/pdf`
    fn fetch_pdf(&self, id: &str) -> impl Future<Output = Result<ApiReply>> + Send;
}

/// `reqwest` implementation of [`DocumentsApi`]
#[derive(Debug, Clone)]
pub struct HttpDocumentsApi {
    client: Client,
    config: ClientConfig,
}

impl HttpDocumentsApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder().timeout(Duration::from_secs(config.timeout));

        if !config.proxy_enabled() {
            client_builder = client_builder.no_proxy();
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    async fn read_reply(response: reqwest::Response) -> Result<ApiReply> {
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(ApiReply::new(status, body.to_vec()))
    }
}

impl DocumentsApi for HttpDocumentsApi {
    async fn list_documents(&self) -> Result<ApiReply> {
        let url = self.config.endpoint_url(DOCUMENTS_PATH)?;
        tracing::debug!(%url, "listing documents");

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        Self::read_reply(response).await
    }

    async fn upload_document(&self, file: &PdfFile) -> Result<ApiReply> {
        let url = self.config.endpoint_url(UPLOAD_PATH)?;
        tracing::debug!(%url, filename = %file.filename, size = file.bytes.len(), "uploading document");

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)
            .map_err(|e| PdfdeskError::invalid_input(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self.client.post(url).multipart(form).send().await?;

        Self::read_reply(response).await
    }

    async fn fetch_pdf(&self, id: &str) -> Result<ApiReply> {
        let url = self.config.segments_url(&document_pdf_segments(id))?;
        tracing::debug!(%url, "fetching document bytes");

        let response = self.client.get(url).send().await?;

        Self::read_reply(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfdesk_protocol::api::ErrorDetail;
    use serde_json::json;

    #[test]
    fn test_reply_success_range() {
        assert!(ApiReply::new(200, "").is_success());
        assert!(ApiReply::new(201, "").is_success());
        assert!(!ApiReply::new(304, "").is_success());
        assert!(!ApiReply::new(400, "").is_success());
    }

    #[test]
    fn test_reply_json() {
        let reply = ApiReply::json_body(400, &json!({ "detail": "too large" }));
        let detail: ErrorDetail = reply.json().unwrap();
        assert_eq!(detail.detail.as_deref(), Some("too large"));

        let garbage = ApiReply::new(502, "<html>Bad Gateway</html>");
        let err = garbage.json::<ErrorDetail>().unwrap_err();
        assert!(err.to_string().contains("P206"));
        assert_eq!(garbage.text(), "<html>Bad Gateway</html>");
    }

    #[test]
    fn test_http_client_rejects_invalid_config() {
        let config = ClientConfig {
            origin: String::new(),
            ..ClientConfig::default()
        };
        assert!(HttpDocumentsApi::new(config).is_err());
    }

    mod wire {
        use super::*;
        use crate::tests::utils::test_helpers::{document_json, sample_document};
        use axum::extract::{Multipart, Path as UrlPath, State};
        use axum::http::{HeaderMap, StatusCode};
        use axum::routing::{get, post};
        use axum::{Json, Router};
        use serde_json::Value;
        use std::sync::{Arc, Mutex};

        #[derive(Debug, Clone)]
        struct ReceivedPart {
            name: String,
            filename: Option<String>,
            content_type: Option<String>,
            bytes: Vec<u8>,
        }

        #[derive(Default)]
        struct Received {
            list_headers: Vec<(String, String)>,
            parts: Vec<ReceivedPart>,
            fetched_ids: Vec<String>,
        }

        type Shared = Arc<Mutex<Received>>;

        async fn list(State(received): State<Shared>, headers: HeaderMap) -> Json<Value> {
            let mut received = received.lock().unwrap();
            for name in ["cache-control", "pragma"] {
                if let Some(value) = headers.get(name) {
                    received
                        .list_headers
                        .push((name.to_string(), value.to_str().unwrap().to_string()));
                }
            }
            Json(json!([document_json(&sample_document("doc-1", "sample.pdf"))]))
        }

        async fn upload(
            State(received): State<Shared>,
            mut multipart: Multipart,
        ) -> (StatusCode, Json<Value>) {
            let mut parts = Vec::new();
            while let Some(field) = multipart.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.unwrap().to_vec();
                parts.push(ReceivedPart {
                    name,
                    filename,
                    content_type,
                    bytes,
                });
            }
            received.lock().unwrap().parts.extend(parts);
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "detail": "too large" })),
            )
        }

        async fn fetch(
            State(received): State<Shared>,
            UrlPath(id): UrlPath<String>,
        ) -> (StatusCode, Vec<u8>) {
            received.lock().unwrap().fetched_ids.push(id.clone());
            if id == "doc-1" {
                (StatusCode::OK, b"%PDF-1.4".to_vec())
            } else {
                (StatusCode::NOT_FOUND, b"{\"detail\":\"Not Found\"}".to_vec())
            }
        }

        /// Serve the backend routes on an ephemeral loopback port
        async fn serve(received: Shared) -> HttpDocumentsApi {
            let app = Router::new()
                .route("/backend/documents", get(list))
                .route("/backend/upload", post(upload))
                .route("/backend/documents/:id/pdf", get(fetch))
                .with_state(received);

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

            HttpDocumentsApi::new(ClientConfig {
                origin: format!("http://{}", addr),
                ..ClientConfig::default()
            })
            .unwrap()
        }

        #[tokio::test]
        async fn test_list_bypasses_caches() {
            let received = Shared::default();
            let api = serve(Arc::clone(&received)).await;

            let reply = api.list_documents().await.unwrap();
            assert_eq!(reply.status, 200);
            let body: Vec<Value> = reply.json().unwrap();
            assert_eq!(body[0]["id"], "doc-1");

            let received = received.lock().unwrap();
            assert_eq!(
                received.list_headers,
                vec![
                    ("cache-control".to_string(), "no-cache, no-store".to_string()),
                    ("pragma".to_string(), "no-cache".to_string()),
                ]
            );
        }

        #[tokio::test]
        async fn test_upload_sends_single_file_part_and_passes_errors_through() {
            let received = Shared::default();
            let api = serve(Arc::clone(&received)).await;
            let file = PdfFile::new("report.pdf", "application/pdf", b"%PDF-1.4".to_vec());

            let reply = api.upload_document(&file).await.unwrap();
            assert_eq!(reply.status, 413);
            let detail: ErrorDetail = reply.json().unwrap();
            assert_eq!(detail.detail.as_deref(), Some("too large"));

            let parts = received.lock().unwrap().parts.clone();
            assert_eq!(parts.len(), 1);
            assert_eq!(parts[0].name, "file");
            assert_eq!(parts[0].filename.as_deref(), Some("report.pdf"));
            assert_eq!(parts[0].content_type.as_deref(), Some("application/pdf"));
            assert_eq!(parts[0].bytes, b"%PDF-1.4");
        }

        #[tokio::test]
        async fn test_fetch_encodes_id_and_returns_missing_as_reply() {
            let received = Shared::default();
            let api = serve(Arc::clone(&received)).await;

            let reply = api.fetch_pdf("doc-1").await.unwrap();
            assert_eq!(reply.status, 200);
            assert_eq!(reply.body, b"%PDF-1.4");

            let missing = api.fetch_pdf("a/b c").await.unwrap();
            assert_eq!(missing.status, 404);

            assert!(api.fetch_pdf("..").await.is_err());

            assert_eq!(
                received.lock().unwrap().fetched_ids,
                vec!["doc-1".to_string(), "a/b c".to_string()]
            );
        }

        #[tokio::test]
        async fn test_unreachable_backend_is_an_error() {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let api = HttpDocumentsApi::new(ClientConfig {
                origin: format!("http://{}", addr),
                ..ClientConfig::default()
            })
            .unwrap();
            assert!(api.list_documents().await.is_err());
        }
    }
}
