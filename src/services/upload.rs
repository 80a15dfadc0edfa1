use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::UploadError;
use crate::kernel::event::Event;
use crate::kernel::job::JobId;
use crate::services::backend::Backend;

/// A recording to submit. Contents are opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl AudioArtifact {
    pub const CONTENT_TYPE: &'static str = "audio/wav";

    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording.wav".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// Submits recordings and hands accepted job ids to the session as pending auto-opens.
///
/// One attempt per call. Failures are returned to the caller and leave the
/// registry untouched.
#[derive(Clone)]
pub struct UploadCoordinator {
    backend: Arc<dyn Backend>,
    events: mpsc::Sender<Event>,
}

impl UploadCoordinator {
    pub fn new(backend: Arc<dyn Backend>, events: mpsc::Sender<Event>) -> Self {
        Self { backend, events }
    }

    pub async fn submit(&self, artifact: AudioArtifact) -> Result<JobId, UploadError> {
        // Correlates log lines until the backend hands out a real id.
        let submission = Uuid::new_v4();
        info!(%submission, file = %artifact.file_name, bytes = artifact.bytes.len(), "Submitting recording");

        let job_id = match self.backend.upload(&artifact).await {
            Ok(job_id) => job_id,
            Err(e) => {
                warn!(%submission, "Upload failed: {}", e);
                return Err(UploadError::Rejected(e));
            }
        };

        info!(%submission, job = %job_id, "Upload accepted");
        self.events
            .send(Event::UploadAccepted {
                job_id: job_id.clone(),
                display_name: artifact.file_name,
            })
            .await
            .map_err(|_| UploadError::Detached)?;

        Ok(job_id)
    }
}
