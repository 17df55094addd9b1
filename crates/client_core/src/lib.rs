use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::{
    domain::OutputFormat,
    protocol::GenerateImageRequest,
    validate::{validate, ValidationMode},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info};

pub mod artifact;
pub mod transport;

pub use artifact::{Artifact, ArtifactStore, RenderHandle, DEFAULT_DOWNLOAD_BASENAME};
pub use transport::{
    GenerationTransport, HttpGenerationTransport, TransportError, DEFAULT_REQUEST_TIMEOUT,
};

const GENERATING_STATUS: &str = "Generating image…";
const DONE_STATUS: &str = "Done.";
const MISSING_IMAGE_STATUS: &str = "No image returned.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Idle,
    Busy,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    fn loading(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Loading,
            text: text.into(),
        }
    }

    fn ok(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Ok,
            text: text.into(),
        }
    }

    fn failed(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Snapshot of everything a UI layer needs to draw the widget. Emitted after
/// every state transition; rendering never reaches back into the machine.
#[derive(Debug, Clone)]
pub struct RenderModel {
    pub state: WidgetState,
    pub status: Option<StatusLine>,
    pub can_generate: bool,
    pub can_clear: bool,
    pub can_download: bool,
    pub preview: Option<RenderHandle>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request was already in flight; nothing happened.
    Refused,
    /// Local validation failed; no network call was issued.
    InvalidRequest(String),
    Completed,
    Failed(String),
}

struct WidgetInner {
    state: WidgetState,
    store: ArtifactStore,
    status: Option<StatusLine>,
    summary: Option<String>,
}

/// Client-side state machine for one widget instance: validates requests
/// locally, dispatches at most one generation at a time, and owns the
/// resulting artifact through [`ArtifactStore`].
pub struct GenerationOrchestrator {
    transport: Arc<dyn GenerationTransport>,
    inner: Mutex<WidgetInner>,
    events: broadcast::Sender<RenderModel>,
}

impl GenerationOrchestrator {
    pub fn new(transport: Arc<dyn GenerationTransport>) -> Arc<Self> {
        let (events, _) = broadcast::channel(32);
        Arc::new(Self {
            transport,
            inner: Mutex::new(WidgetInner {
                state: WidgetState::Idle,
                store: ArtifactStore::default(),
                status: None,
                summary: None,
            }),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RenderModel> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> WidgetState {
        self.inner.lock().await.state
    }

    pub async fn render(&self) -> RenderModel {
        snapshot(&*self.inner.lock().await)
    }

    pub async fn artifact(&self) -> Option<Artifact> {
        self.inner.lock().await.store.current().cloned()
    }

    /// Runs the validator in auto-correct mode, then dispatches the request.
    /// Refused outright while a generation is outstanding: there is no queue
    /// and no cancellation, only one request in flight at a time.
    pub async fn submit(&self, raw: GenerateImageRequest) -> SubmitOutcome {
        let validated = {
            let mut inner = self.inner.lock().await;
            if inner.state == WidgetState::Busy {
                return SubmitOutcome::Refused;
            }
            match validate(&raw, ValidationMode::AutoCorrect) {
                Ok(validated) => {
                    inner.state = WidgetState::Busy;
                    inner.status = Some(StatusLine::loading(GENERATING_STATUS));
                    self.emit(&inner);
                    validated
                }
                Err(err) => {
                    let message = err.to_string();
                    inner.state = WidgetState::Idle;
                    inner.status = Some(StatusLine::failed(message.clone()));
                    self.emit(&inner);
                    return SubmitOutcome::InvalidRequest(message);
                }
            }
        };

        if let Some(notice) = validated.notice {
            info!(%notice, "request corrected before submit");
        }

        let wire = GenerateImageRequest::from(&validated.request);
        let result = self.transport.generate(&wire).await;

        // Busy always exits here, whatever the transport produced.
        let mut inner = self.inner.lock().await;
        match result {
            Ok(response) => {
                let format = OutputFormat::parse(&response.output_format)
                    .unwrap_or(validated.request.output_format);
                match STANDARD.decode(response.b64.as_bytes()) {
                    Ok(bytes) if !bytes.is_empty() => {
                        inner.store.put(bytes, format);
                        inner.summary = Some(summary_line(
                            non_empty_or(&response.size, validated.request.size.as_str()),
                            format,
                            non_empty_or(&response.quality, validated.request.quality.as_str()),
                        ));
                        inner.state = WidgetState::Ready;
                        inner.status = Some(StatusLine::ok(DONE_STATUS));
                        self.emit(&inner);
                        SubmitOutcome::Completed
                    }
                    _ => {
                        error!("generation response carried an undecodable payload");
                        inner.state = WidgetState::Error;
                        inner.status = Some(StatusLine::failed(MISSING_IMAGE_STATUS));
                        self.emit(&inner);
                        SubmitOutcome::Failed(MISSING_IMAGE_STATUS.to_string())
                    }
                }
            }
            Err(err) => {
                let message = err.to_string();
                error!(%message, "generation failed");
                inner.state = WidgetState::Error;
                inner.status = Some(StatusLine::failed(message.clone()));
                self.emit(&inner);
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Discards the current artifact and returns to `Idle`. Ignored while
    /// Busy; the pending request keeps exclusive use of the store.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == WidgetState::Busy {
            return;
        }
        inner.store.clear();
        inner.summary = None;
        inner.status = None;
        inner.state = WidgetState::Idle;
        self.emit(&inner);
    }

    /// Teardown. Releases the artifact; safe to call repeatedly.
    pub async fn release(&self) {
        let mut inner = self.inner.lock().await;
        inner.store.release();
        inner.summary = None;
    }

    fn emit(&self, inner: &WidgetInner) {
        let _ = self.events.send(snapshot(inner));
    }
}

fn snapshot(inner: &WidgetInner) -> RenderModel {
    let busy = inner.state == WidgetState::Busy;
    RenderModel {
        state: inner.state,
        status: inner.status.clone(),
        can_generate: !busy,
        can_clear: !busy,
        can_download: !busy && inner.store.current().is_some(),
        preview: inner.store.current().map(Artifact::handle),
        summary: inner.summary.clone(),
    }
}

fn summary_line(size: &str, format: OutputFormat, quality: &str) -> String {
    format!("{size} • {} • {quality}", format.as_str().to_uppercase())
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
