use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::dashboard::{summarize, DashboardSummary};
use super::epoch::FetchSeq;
use super::job::{Job, JobId, JobLifecycle, JobStatus};
use crate::error::RegistryError;

/// What the view layer is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Focus {
    /// The aggregate dashboard; no single job is focused.
    #[default]
    Home,
    Job(JobId),
}

/// Result of offering a snapshot to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Applied { auto_opened: Vec<JobId> },
    /// An equal or newer fetch was already applied. Nothing changed.
    Stale,
}

/// Read-only copy of the registry handed to observers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistryView {
    pub version: u64,
    /// In backend listing order.
    pub all_jobs: Vec<Job>,
    /// Most recently opened first.
    pub open_jobs: Vec<Job>,
    pub focus: Focus,
    pub pending: Vec<JobId>,
    pub dashboard: DashboardSummary,
}

/// Canonical in-memory state: every known job, the subset kept open, and focus.
/// Mutated only through the operations below; every mutation bumps `version`
/// and publishes a fresh `RegistryView`.
#[derive(Debug)]
pub struct PresentationRegistry {
    all_jobs: HashMap<JobId, Job>,
    listing: Vec<JobId>,
    open_jobs: Vec<Job>,
    focus: Focus,
    /// Awaiting auto-open, in registration order.
    pending: Vec<JobId>,
    last_applied: Option<FetchSeq>,
    pub version: u64,
    publisher: watch::Sender<RegistryView>,
}

impl Default for PresentationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationRegistry {
    pub fn new() -> Self {
        let (publisher, _) = watch::channel(RegistryView::default());
        Self {
            all_jobs: HashMap::new(),
            listing: Vec::new(),
            open_jobs: Vec::new(),
            focus: Focus::Home,
            pending: Vec::new(),
            last_applied: None,
            version: 0,
            publisher,
        }
    }

    /// Replace the known job list with a fetched snapshot.
    ///
    /// Snapshots whose fetch was issued before the last applied one are discarded.
    /// Open entries are refreshed in place by id. Pending ids observed as
    /// completed are opened and focused once, then leave the pending set.
    pub fn apply_snapshot(&mut self, seq: FetchSeq, jobs: Vec<Job>) -> SnapshotOutcome {
        if let Some(last) = self.last_applied {
            if seq <= last {
                debug!("Discarded stale snapshot {:?} (applied {:?})", seq, last);
                return SnapshotOutcome::Stale;
            }
        }
        self.last_applied = Some(seq);

        let mut fresh: HashMap<JobId, Job> = HashMap::with_capacity(jobs.len());
        let mut listing = Vec::with_capacity(jobs.len());
        for job in jobs {
            if let Some(previous) = self.all_jobs.get(&job.id) {
                if !JobLifecycle::is_forward(&previous.status, &job.status) {
                    warn!("Job {} reported {} after {}", job.id, job.status, previous.status);
                }
            }
            // Duplicate ids within one snapshot: the later record wins.
            if !fresh.contains_key(&job.id) {
                listing.push(job.id.clone());
            }
            fresh.insert(job.id.clone(), job);
        }
        self.all_jobs = fresh;
        self.listing = listing;

        // Open entries keep their identity; only their fields move.
        // Jobs missing from the snapshot keep their last known fields.
        for open in self.open_jobs.iter_mut() {
            if let Some(latest) = self.all_jobs.get(&open.id) {
                open.refresh_from(latest);
            }
        }

        let auto_opened = self.resolve_pending();
        self.commit();
        SnapshotOutcome::Applied { auto_opened }
    }

    fn resolve_pending(&mut self) -> Vec<JobId> {
        let mut opened = Vec::new();
        let pending = std::mem::take(&mut self.pending);

        for id in pending {
            let status = self.all_jobs.get(&id).map(|job| job.status.clone());
            match status {
                Some(JobStatus::Completed) => {
                    if !self.is_open(&id) {
                        if let Some(job) = self.all_jobs.get(&id) {
                            info!("Auto-opening completed job {}", id);
                            self.open_jobs.insert(0, job.clone());
                            self.focus = Focus::Job(id.clone());
                            opened.push(id);
                        }
                    }
                }
                Some(JobStatus::Failed) => {
                    info!("Pending job {} failed; it will not be auto-opened", id);
                }
                _ => self.pending.push(id),
            }
        }

        opened
    }

    /// Keep `job_id` open and focus it. Opening an already-open job only moves focus.
    pub fn open(&mut self, job_id: &JobId) -> Result<(), RegistryError> {
        if !self.is_open(job_id) {
            let job = self
                .all_jobs
                .get(job_id)
                .cloned()
                .ok_or_else(|| RegistryError::UnknownJob(job_id.clone()))?;
            self.open_jobs.insert(0, job);
        }
        self.focus = Focus::Job(job_id.clone());
        self.commit();
        Ok(())
    }

    pub fn focus_home(&mut self) {
        self.focus = Focus::Home;
        self.commit();
    }

    /// Drop an entry from the open list. Focus falls back to home if it was focused.
    pub fn close(&mut self, job_id: &JobId) {
        let before = self.open_jobs.len();
        self.open_jobs.retain(|job| &job.id != job_id);
        if self.open_jobs.len() == before {
            return;
        }
        if self.focus == Focus::Job(job_id.clone()) {
            self.focus = Focus::Home;
        }
        self.commit();
    }

    /// Remember `job_id` for auto-open on its first completed observation.
    pub fn register_pending(&mut self, job_id: JobId) {
        if self.pending.contains(&job_id) {
            return;
        }
        info!("Job {} awaiting completion", job_id);
        self.pending.push(job_id);
        self.commit();
    }

    /// Remove every trace of a job (after it was deleted on the backend).
    pub fn forget(&mut self, job_id: &JobId) {
        self.all_jobs.remove(job_id);
        self.listing.retain(|id| id != job_id);
        self.open_jobs.retain(|job| &job.id != job_id);
        self.pending.retain(|id| id != job_id);
        if self.focus == Focus::Job(job_id.clone()) {
            self.focus = Focus::Home;
        }
        self.commit();
    }

    fn commit(&mut self) {
        self.version += 1;
        let view = self.view();
        self.publisher.send_replace(view);
    }

    // Read-only accessors

    pub fn view(&self) -> RegistryView {
        RegistryView {
            version: self.version,
            all_jobs: self.jobs().cloned().collect(),
            open_jobs: self.open_jobs.clone(),
            focus: self.focus.clone(),
            pending: self.pending.clone(),
            dashboard: self.dashboard(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RegistryView> {
        self.publisher.subscribe()
    }

    /// Every known job in backend listing order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.listing.iter().filter_map(|id| self.all_jobs.get(id))
    }

    pub fn job(&self, job_id: &JobId) -> Option<&Job> {
        self.all_jobs.get(job_id)
    }

    pub fn open_jobs(&self) -> &[Job] {
        &self.open_jobs
    }

    pub fn is_open(&self, job_id: &JobId) -> bool {
        self.open_jobs.iter().any(|job| &job.id == job_id)
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn focused(&self) -> Option<&Job> {
        match &self.focus {
            Focus::Home => None,
            Focus::Job(id) => self.open_jobs.iter().find(|job| &job.id == id),
        }
    }

    pub fn pending(&self) -> &[JobId] {
        &self.pending
    }

    pub fn last_applied(&self) -> Option<FetchSeq> {
        self.last_applied
    }

    pub fn dashboard(&self) -> DashboardSummary {
        summarize(self.jobs())
    }
}
