use super::*;
use axum::{http::StatusCode, routing::post, Json, Router};
use shared::domain::{Background, ImageQuality, ImageSize, OutputFormat};

fn request() -> GenerationRequest {
    GenerationRequest {
        prompt: "a red balloon".to_string(),
        size: ImageSize::Square1024,
        quality: ImageQuality::Auto,
        background: Background::Auto,
        output_format: OutputFormat::Png,
    }
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn provider_for(base_url: String) -> OpenAiImageProvider {
    let mut config = OpenAiConfig::new("test-key");
    config.base_url = base_url;
    OpenAiImageProvider::new(config).expect("provider")
}

#[tokio::test]
async fn generate_returns_payload_and_effective_values() {
    let router = Router::new().route(
        "/images/generations",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["model"], "gpt-image-1");
            assert_eq!(body["n"], 1);
            assert_eq!(body["size"], "1024x1024");
            Json(serde_json::json!({
                "data": [{"b64_json": "aGVsbG8="}],
                "size": "1024x1024",
                "quality": "high",
                "output_format": "png"
            }))
        }),
    );
    let base_url = serve(router).await;

    let image = provider_for(base_url)
        .generate(&request())
        .await
        .expect("image");

    assert_eq!(image.b64, "aGVsbG8=");
    assert_eq!(image.output_format, "png");
    assert_eq!(image.size, "1024x1024");
    // the provider resolved `auto` quality to a concrete value
    assert_eq!(image.quality, "high");
    // absent in the response, so the requested value is echoed
    assert_eq!(image.background, "auto");
}

#[tokio::test]
async fn missing_payload_is_missing_image_data() {
    let router = Router::new().route(
        "/images/generations",
        post(|| async { Json(serde_json::json!({"data": []})) }),
    );
    let base_url = serve(router).await;

    let err = provider_for(base_url)
        .generate(&request())
        .await
        .expect_err("no payload");

    assert!(matches!(err, ProviderError::MissingImageData));
    assert_eq!(err.to_string(), "No image data returned.");
}

#[tokio::test]
async fn api_error_message_is_surfaced_verbatim() {
    let router = Router::new().route(
        "/images/generations",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": {"message": "Billing hard limit reached"}})),
            )
        }),
    );
    let base_url = serve(router).await;

    let err = provider_for(base_url)
        .generate(&request())
        .await
        .expect_err("api error");

    match err {
        ProviderError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Billing hard limit reached");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
