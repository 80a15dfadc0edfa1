use chrono::NaiveDateTime;
use serde::{Serialize, Deserialize};
use std::fmt;

/// Opaque backend-assigned identifier. Primary key of the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Backend status tag. The vocabulary is the backend's; anything unrecognised
/// is kept verbatim rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => Self::Pending,
            "processing" | "running" => Self::Processing,
            "completed" | "complete" | "done" => Self::Completed,
            "failed" | "error" => Self::Failed,
            _ => Self::Other(tag.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted recording and its analysis lifecycle ("presentation").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Original filename.
    pub display_name: String,
    pub status: JobStatus,
    /// Whole seconds. Unknown until the backend has measured the recording.
    pub duration_seconds: Option<u64>,
    pub submitted_at: Option<NaiveDateTime>,
}

impl Job {
    pub fn new(id: impl Into<JobId>, display_name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            status,
            duration_seconds: None,
            submitted_at: None,
        }
    }

    pub fn with_duration(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// Copy the mutable fields of a fresher record into this one.
    /// Identity (`id`) is never touched.
    pub fn refresh_from(&mut self, latest: &Job) {
        self.display_name.clone_from(&latest.display_name);
        self.status = latest.status.clone();
        self.duration_seconds = latest.duration_seconds;
        self.submitted_at = latest.submitted_at;
    }
}

/// The lifecycle graph a job is expected to follow:
/// `pending -> processing -> completed | failed`.
/// Used for diagnostics only; observed statuses are always reflected as reported.
pub struct JobLifecycle;

impl JobLifecycle {
    /// Pure function: (previous, observed) -> whether the observation is a forward move.
    /// Skipped intermediate states (pending straight to completed) count as forward.
    pub fn is_forward(previous: &JobStatus, observed: &JobStatus) -> bool {
        use JobStatus::*;

        match (previous, observed) {
            (a, b) if a == b => true,
            (Pending, Processing | Completed | Failed) => true,
            (Processing, Completed | Failed) => true,
            // Terminal states never move.
            (terminal, _) if terminal.is_terminal() => false,
            // Unknown vocabulary: no opinion.
            (Other(_), _) | (_, Other(_)) => true,
            _ => false,
        }
    }
}
