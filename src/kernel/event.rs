use super::analytics::ClassifiedFeedback;
use super::epoch::FetchSeq;
use super::job::{Job, JobId};

/// Everything that flows into the session from the network boundary.
#[derive(Debug, Clone)]
pub enum Event {
    /// Full job list from one poll tick.
    Snapshot { seq: FetchSeq, jobs: Vec<Job> },
    /// Backend acknowledged an upload and assigned an id.
    UploadAccepted { job_id: JobId, display_name: String },
    FeedbackLoaded { job_id: JobId, feedback: ClassifiedFeedback },
    AudioLoaded { job_id: JobId, bytes: Vec<u8> },
    JobDeleted { job_id: JobId },
    /// A per-job request failed. Transient; state is left untouched.
    RequestFailed { job_id: JobId, kind: RequestKind, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Feedback,
    Audio,
    Delete,
}

/// Requests from the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(JobId),
    Close(JobId),
    Home,
    /// Delete on the backend, then drop locally.
    Delete(JobId),
}

/// Work the session wants performed at the network boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    LoadFeedback(JobId),
    LoadAudio(JobId),
    DeleteJob(JobId),
}
