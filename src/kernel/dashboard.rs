use chrono::NaiveDateTime;
use serde::{Serialize, Deserialize};
use super::job::{Job, JobStatus};

/// Aggregate "home" view over every known job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub completed: usize,
    pub in_flight: usize,
    pub failed: usize,
    /// Sum of known durations of completed jobs.
    pub practiced_seconds: u64,
    pub last_submitted_at: Option<NaiveDateTime>,
}

impl DashboardSummary {
    pub fn practiced_hours(&self) -> f64 {
        self.practiced_seconds as f64 / 3600.0
    }
}

pub fn summarize<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> DashboardSummary {
    let mut summary = DashboardSummary::default();

    for job in jobs {
        summary.total += 1;
        match job.status {
            JobStatus::Completed => {
                summary.completed += 1;
                summary.practiced_seconds += job.duration_seconds.unwrap_or(0);
            }
            JobStatus::Failed => summary.failed += 1,
            JobStatus::Pending | JobStatus::Processing | JobStatus::Other(_) => summary.in_flight += 1,
        }
        if job.submitted_at > summary.last_submitted_at {
            summary.last_submitted_at = job.submitted_at;
        }
    }

    summary
}
