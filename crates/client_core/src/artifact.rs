use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::domain::OutputFormat;

pub const DEFAULT_DOWNLOAD_BASENAME: &str = "generated-image";

/// A revocable reference a UI layer can bind to an image surface. Stays
/// readable until the owning store releases it, after which `bytes` returns
/// `None`, the equivalent of a revoked object URL.
#[derive(Debug, Clone)]
pub struct RenderHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    bytes: Arc<Vec<u8>>,
    mime_type: &'static str,
    revoked: AtomicBool,
}

impl RenderHandle {
    fn new(bytes: Arc<Vec<u8>>, mime_type: &'static str) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                bytes,
                mime_type,
                revoked: AtomicBool::new(false),
            }),
        }
    }

    pub fn is_live(&self) -> bool {
        !self.inner.revoked.load(Ordering::Acquire)
    }

    pub fn mime_type(&self) -> &'static str {
        self.inner.mime_type
    }

    pub fn bytes(&self) -> Option<Arc<Vec<u8>>> {
        if self.is_live() {
            Some(Arc::clone(&self.inner.bytes))
        } else {
            None
        }
    }

    fn revoke(&self) {
        self.inner.revoked.store(true, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    bytes: Arc<Vec<u8>>,
    format: OutputFormat,
    handle: RenderHandle,
}

impl Artifact {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn handle(&self) -> RenderHandle {
        self.handle.clone()
    }
}

/// Owns the single live artifact of the current session. `put` releases the
/// previous render handle before creating the next one, so repeated
/// generations never leak a stale binding.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    current: Option<Artifact>,
}

impl ArtifactStore {
    pub fn put(&mut self, bytes: Vec<u8>, format: OutputFormat) -> &Artifact {
        self.revoke_current();
        let bytes = Arc::new(bytes);
        let handle = RenderHandle::new(Arc::clone(&bytes), format.mime_type());
        self.current.insert(Artifact {
            bytes,
            format,
            handle,
        })
    }

    pub fn current(&self) -> Option<&Artifact> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.revoke_current();
    }

    /// Teardown. Safe to call any number of times.
    pub fn release(&mut self) {
        self.revoke_current();
    }

    fn revoke_current(&mut self) {
        if let Some(artifact) = self.current.take() {
            artifact.handle.revoke();
        }
    }

    pub fn suggested_filename(base_name: &str, artifact: &Artifact) -> String {
        let base_name = base_name.trim();
        let base_name = if base_name.is_empty() {
            DEFAULT_DOWNLOAD_BASENAME
        } else {
            base_name
        };
        format!("{base_name}.{}", artifact.format().file_extension())
    }
}

#[cfg(test)]
#[path = "tests/artifact_tests.rs"]
mod tests;
