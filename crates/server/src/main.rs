use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use openai_integration::{ImageProvider, OpenAiConfig, OpenAiImageProvider, ProviderError};
use shared::{
    error::ErrorBody,
    protocol::{GenerateImageRequest, GenerateImageResponse, GENERATE_IMAGE_PATH},
    validate::{validate, ValidationMode},
};
use tower_http::services::ServeDir;
use tracing::{error, info};

mod config;

use config::load_settings;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
struct AppState {
    provider: Arc<dyn ImageProvider>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let api_key = settings.openai_api_key.clone().ok_or_else(|| {
        anyhow::anyhow!("missing OPENAI_API_KEY; set it in the environment or in server.toml")
    })?;

    let mut provider_config = OpenAiConfig::new(api_key);
    provider_config.base_url = settings.openai_base_url.clone();
    provider_config.model = settings.openai_image_model.clone();
    provider_config.request_timeout = Duration::from_secs(settings.provider_timeout_seconds);
    let provider = OpenAiImageProvider::new(provider_config)?;

    let state = AppState {
        provider: Arc::new(provider),
    };
    let app = build_router(state, &settings.public_dir);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "image widget server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState, public_dir: &str) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(GENERATE_IMAGE_PATH, post(generate_image))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// The authoritative validation pass runs here in strict mode: a payload the
/// client should already have corrected is rejected, never reinterpreted.
async fn generate_image(
    State(state): State<AppState>,
    Json(raw): Json<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, (StatusCode, Json<ErrorBody>)> {
    let validated = validate(&raw, ValidationMode::Strict)
        .map_err(|err| (StatusCode::BAD_REQUEST, Json(ErrorBody::new(err.to_string()))))?;

    let image = state
        .provider
        .generate(&validated.request)
        .await
        .map_err(|err| match err {
            ProviderError::MissingImageData => {
                error!("provider returned no image payload");
                (StatusCode::BAD_GATEWAY, Json(ErrorBody::new(err.to_string())))
            }
            other => {
                error!(%other, "image generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(other.to_string())),
                )
            }
        })?;

    info!(
        size = %image.size,
        quality = %image.quality,
        output_format = %image.output_format,
        "image generated"
    );

    Ok(Json(GenerateImageResponse {
        b64: image.b64,
        output_format: image.output_format,
        size: image.size,
        quality: image.quality,
        background: image.background,
    }))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
