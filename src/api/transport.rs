// Transport layer for the explorer API
//
// One trait at the seam between the dispatcher and the network so the
// dispatcher can be exercised without a live server. Non-2xx responses are
// not errors here: the status and decoded body travel upward and the
// dispatcher decides what they mean.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::api::error::AppError;
use crate::config::Config;

/// Decoded response from the explorer API
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Dataset file to ingest under a table/collection name
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub table_name: String,
}

impl UploadForm {
    /// Read a dataset file from disk
    pub async fn from_path(path: &Path, table_name: &str) -> Result<Self, AppError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| AppError::Validation(format!("Not a file: {}", path.display())))?
            .to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::Validation(format!("Failed to read dataset {}: {}", path.display(), e))
        })?;

        Ok(Self {
            file_name,
            bytes,
            table_name: table_name.to_string(),
        })
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<TransportResponse, AppError>;

    async fn post_json(&self, path: &str, body: &Value) -> Result<TransportResponse, AppError>;

    async fn post_multipart(&self, path: &str, form: UploadForm) -> Result<TransportResponse, AppError>;
}

/// reqwest-backed transport bound to the configured server
pub struct HttpTransport {
    base_url: Url,
    http_client: HttpClient,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http_client = HttpClient::builder()
            .connect_timeout(Duration::from_secs(config.http.connect_timeout_secs))
            .user_agent(config.http.user_agent.clone())
            .build()?;

        Ok(Self {
            base_url: config.api_base()?,
            http_client,
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, AppError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn decode(response: reqwest::Response) -> Result<TransportResponse, AppError> {
        let status = response.status().as_u16();
        let text = response.text().await?;

        if text.trim().is_empty() {
            return Ok(TransportResponse::new(status, Value::Null));
        }

        let body = serde_json::from_str(&text).map_err(|e| {
            AppError::Transport(format!("malformed response (status {}): {}", status, e))
        })?;

        Ok(TransportResponse::new(status, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<TransportResponse, AppError> {
        let url = self.url_for(path)?;
        tracing::info!("GET {}", url);

        let response = self.http_client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<TransportResponse, AppError> {
        let url = self.url_for(path)?;
        tracing::info!("POST {}", url);

        let response = self.http_client.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn post_multipart(&self, path: &str, form: UploadForm) -> Result<TransportResponse, AppError> {
        let url = self.url_for(path)?;
        tracing::info!("POST {} (multipart, {} bytes)", url, form.bytes.len());

        let part = Part::bytes(form.bytes).file_name(form.file_name);
        let multipart = Form::new()
            .part("dataset", part)
            .text("table_name", form.table_name);

        let response = self.http_client.post(url).multipart(multipart).send().await?;
        Self::decode(response).await
    }
}
