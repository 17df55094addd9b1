use serde::{Deserialize, Serialize};

use crate::domain::GenerationRequest;

pub const GENERATE_IMAGE_PATH: &str = "/api/generate-image";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub output_format: String,
}

impl From<&GenerationRequest> for GenerateImageRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            prompt: request.prompt.clone(),
            size: request.size.as_str().to_string(),
            quality: request.quality.as_str().to_string(),
            background: request.background.as_str().to_string(),
            output_format: request.output_format.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    pub b64: String,
    pub output_format: String,
    pub size: String,
    pub quality: String,
    pub background: String,
}
