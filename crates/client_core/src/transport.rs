use std::time::Duration;

use async_trait::async_trait;
use shared::{
    error::ErrorBody,
    protocol::{GenerateImageRequest, GenerateImageResponse},
};
use thiserror::Error;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-2xx response; carries the server's own error text.
    #[error("{0}")]
    Server(String),
    #[error("No image returned.")]
    MissingPayload,
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(
        &self,
        request: &GenerateImageRequest,
    ) -> Result<GenerateImageResponse, TransportError>;
}

pub struct HttpGenerationTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpGenerationTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl GenerationTransport for HttpGenerationTransport {
    async fn generate(
        &self,
        request: &GenerateImageRequest,
    ) -> Result<GenerateImageResponse, TransportError> {
        let response = self.http.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .and_then(|text| serde_json::from_str::<ErrorBody>(&text).ok())
                .map(|body| body.error)
                .unwrap_or_else(|| format!("Request failed ({})", status.as_u16()));
            return Err(TransportError::Server(message));
        }

        let body: GenerateImageResponse = response
            .json()
            .await
            .map_err(|_| TransportError::MissingPayload)?;
        if body.b64.is_empty() {
            return Err(TransportError::MissingPayload);
        }
        Ok(body)
    }
}
