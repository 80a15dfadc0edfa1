//! Error types for podium.
//!
//! Nothing here is fatal to the process: backend failures are retried on the
//! next tick or surfaced to the user, registry errors reject a single operation.

use std::path::PathBuf;
use thiserror::Error;

use crate::kernel::job::JobId;

/// Failures at the backend boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure (connection refused, reset, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// Body did not match the expected schema
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Analysis requested before the job completed
    #[error("Analysis for {job_id} is not ready (status: {status})")]
    NotReady { job_id: JobId, status: String },

    /// The backend gave up on the job
    #[error("Analysis for {job_id} failed: {reason}")]
    Failed { job_id: JobId, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown job: {0}")]
    UnknownJob(JobId),
}

/// Upload failures. Surfaced to the user; never retried automatically.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload rejected: {0}")]
    Rejected(#[from] BackendError),

    #[error("Session is no longer accepting events")]
    Detached,
}
