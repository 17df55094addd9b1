use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::domain::GenerationRequest;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("No image data returned.")]
    MissingImageData,
}

/// One generated image plus the parameter values the provider actually used,
/// which may differ from the requested ones when `auto` is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderImage {
    pub b64: String,
    pub output_format: String,
    pub size: String,
    pub quality: String,
    pub background: String,
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<ProviderImage, ProviderError>;
}

#[derive(Debug, Serialize)]
struct ImagesGenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    quality: &'a str,
    background: &'a str,
    output_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImagesGenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    quality: Option<String>,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    output_format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct OpenAiImageProvider {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiImageProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<ProviderImage, ProviderError> {
        let body = ImagesGenerationBody {
            model: &self.config.model,
            prompt: &request.prompt,
            n: 1,
            size: request.size.as_str(),
            quality: request.quality.as_str(),
            background: request.background.as_str(),
            output_format: request.output_format.as_str(),
        };

        info!(
            model = %self.config.model,
            size = body.size,
            quality = body.quality,
            output_format = body.output_format,
            "requesting image generation"
        );

        let response = self
            .http
            .post(format!("{}/images/generations", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .and_then(|text| serde_json::from_str::<ApiErrorBody>(&text).ok())
                .map(|parsed| parsed.error.message)
                .unwrap_or_else(|| format!("image generation failed ({status})"));
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ImagesGenerationResponse = response.json().await?;
        let b64 = parsed
            .data
            .into_iter()
            .next()
            .and_then(|image| image.b64_json)
            .filter(|payload| !payload.is_empty())
            .ok_or(ProviderError::MissingImageData)?;

        Ok(ProviderImage {
            b64,
            output_format: parsed
                .output_format
                .unwrap_or_else(|| request.output_format.as_str().to_string()),
            size: parsed
                .size
                .unwrap_or_else(|| request.size.as_str().to_string()),
            quality: parsed
                .quality
                .unwrap_or_else(|| request.quality.as_str().to_string()),
            background: parsed
                .background
                .unwrap_or_else(|| request.background.as_str().to_string()),
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
