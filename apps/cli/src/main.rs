use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{ArtifactStore, GenerationOrchestrator, HttpGenerationTransport, SubmitOutcome};
use shared::protocol::{GenerateImageRequest, GENERATE_IMAGE_PATH};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server_url: String,
    #[arg(long)]
    prompt: String,
    #[arg(long, default_value = "1024x1024")]
    size: String,
    #[arg(long, default_value = "auto")]
    quality: String,
    #[arg(long, default_value = "auto")]
    background: String,
    #[arg(long, default_value = "png")]
    output_format: String,
    /// Base name for the saved file; the extension follows the output format.
    #[arg(long, default_value = "generated-image")]
    out: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let endpoint = format!(
        "{}{GENERATE_IMAGE_PATH}",
        args.server_url.trim_end_matches('/')
    );
    let transport = HttpGenerationTransport::new(endpoint)?;
    let orchestrator = GenerationOrchestrator::new(Arc::new(transport));

    let outcome = orchestrator
        .submit(GenerateImageRequest {
            prompt: args.prompt,
            size: args.size,
            quality: args.quality,
            background: args.background,
            output_format: args.output_format,
        })
        .await;

    match outcome {
        SubmitOutcome::Completed => {}
        SubmitOutcome::InvalidRequest(message) | SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::Refused => bail!("a generation request is already in flight"),
    }

    let render = orchestrator.render().await;
    if let Some(summary) = render.summary {
        println!("{summary}");
    }

    let artifact = orchestrator
        .artifact()
        .await
        .context("no artifact after a completed generation")?;
    let filename = ArtifactStore::suggested_filename(&args.out, &artifact);
    std::fs::write(&filename, artifact.bytes())
        .with_context(|| format!("failed to write {filename}"))?;
    println!("saved {filename} ({} bytes)", artifact.bytes().len());

    orchestrator.release().await;
    Ok(())
}
