use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::analytics::{AnalyticsDeriver, ClassifiedFeedback};
use super::event::{Command, Event, RequestKind, SideEffect};
use super::job::{JobId, JobStatus};
use super::registry::{PresentationRegistry, SnapshotOutcome};
use crate::error::RegistryError;
use crate::services::backend::Backend;

/// The single owner of `PresentationRegistry`.
///
/// Events from the poller, upload and per-job requests arrive on one channel and
/// are applied in arrival order inside one task, so registry mutation is never
/// concurrent. Network work is handed back to the caller as `SideEffect`s.
pub struct Session {
    pub receiver: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    pub registry: PresentationRegistry,
    poll_cancel: CancellationToken,
    audio_requested: HashSet<JobId>,
    feedback: HashMap<JobId, ClassifiedFeedback>,
    audio: HashMap<JobId, Vec<u8>>,
}

impl Session {
    pub fn new(receiver: mpsc::Receiver<Event>, tx: mpsc::Sender<Event>, poll_cancel: CancellationToken) -> Self {
        Self {
            receiver,
            tx,
            registry: PresentationRegistry::new(),
            poll_cancel,
            audio_requested: HashSet::new(),
            feedback: HashMap::new(),
            audio: HashMap::new(),
        }
    }

    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    /// Apply a batch of events. Returns the network work they call for.
    /// MUST NOT await.
    pub fn step(&mut self, events: Vec<Event>) -> Vec<SideEffect> {
        let mut effects = Vec::new();

        for event in events {
            match event {
                Event::Snapshot { seq, jobs } => {
                    // A fetch that resolved after the poller was stopped.
                    if self.poll_cancel.is_cancelled() {
                        debug!("Dropped snapshot {:?} after poller shutdown", seq);
                        continue;
                    }
                    let before = self.registry.focused().map(|job| (job.id.clone(), job.status.clone()));

                    if let SnapshotOutcome::Applied { auto_opened } = self.registry.apply_snapshot(seq, jobs) {
                        let focused = self.registry.focused().map(|job| (job.id.clone(), job.status.clone()));
                        let reload = match (&before, focused) {
                            // Focus moved to a freshly completed upload.
                            (_, Some((id, _))) if !auto_opened.is_empty() => Some(id),
                            // The job on screen just finished processing.
                            (Some((was_id, was_status)), Some((id, JobStatus::Completed)))
                                if *was_id == id && *was_status != JobStatus::Completed =>
                            {
                                Some(id)
                            }
                            _ => None,
                        };
                        if let Some(id) = reload {
                            effects.extend(self.on_focused(id));
                        }
                    }
                }
                Event::UploadAccepted { job_id, display_name } => {
                    info!("Upload of {} accepted as {}", display_name, job_id);
                    self.registry.register_pending(job_id);
                }
                Event::FeedbackLoaded { job_id, feedback } => {
                    if self.is_known(&job_id) {
                        info!(
                            "Feedback for {}: {} filler words, {} fast / {} slow, {} loud / {} quiet, mostly {}",
                            job_id,
                            feedback.total_filler_words,
                            feedback.pacing.fast,
                            feedback.pacing.slow,
                            feedback.volume.loud,
                            feedback.volume.quiet,
                            feedback.dominant_emotion,
                        );
                        self.feedback.insert(job_id, feedback);
                    }
                }
                Event::AudioLoaded { job_id, bytes } => {
                    if self.is_known(&job_id) {
                        self.audio.insert(job_id, bytes);
                    }
                }
                Event::JobDeleted { job_id } => {
                    info!("Job {} deleted", job_id);
                    self.registry.forget(&job_id);
                    self.drop_cached(&job_id);
                }
                Event::RequestFailed { job_id, kind, reason } => {
                    warn!("{:?} request for {} failed: {}", kind, job_id, reason);
                    if kind == RequestKind::Audio {
                        // Allow the next focus to try again.
                        self.audio_requested.remove(&job_id);
                    }
                }
            }
        }

        effects
    }

    pub fn command(&mut self, command: Command) -> Result<Vec<SideEffect>, RegistryError> {
        match command {
            Command::Open(job_id) => {
                self.registry.open(&job_id)?;
                Ok(self.on_focused(job_id))
            }
            Command::Close(job_id) => {
                self.registry.close(&job_id);
                self.drop_cached(&job_id);
                Ok(Vec::new())
            }
            Command::Home => {
                self.registry.focus_home();
                Ok(Vec::new())
            }
            Command::Delete(job_id) => {
                if !self.is_known(&job_id) {
                    return Err(RegistryError::UnknownJob(job_id));
                }
                Ok(vec![SideEffect::DeleteJob(job_id)])
            }
        }
    }

    /// Report is fetched (and derived) on every focus; audio only the first time.
    fn on_focused(&mut self, job_id: JobId) -> Vec<SideEffect> {
        let mut effects = vec![SideEffect::LoadFeedback(job_id.clone())];
        if self.audio_requested.insert(job_id.clone()) {
            effects.push(SideEffect::LoadAudio(job_id));
        }
        effects
    }

    /// A closed job is fetched again in full when reopened.
    fn drop_cached(&mut self, job_id: &JobId) {
        self.feedback.remove(job_id);
        self.audio.remove(job_id);
        self.audio_requested.remove(job_id);
    }

    fn is_known(&self, job_id: &JobId) -> bool {
        self.registry.job(job_id).is_some() || self.registry.is_open(job_id)
    }

    pub fn feedback(&self, job_id: &JobId) -> Option<&ClassifiedFeedback> {
        self.feedback.get(job_id)
    }

    pub fn audio(&self, job_id: &JobId) -> Option<&[u8]> {
        self.audio.get(job_id).map(Vec::as_slice)
    }

    /// Perform one side effect off-task; its outcome comes back as an `Event`.
    pub fn execute(&self, effect: SideEffect, backend: Arc<dyn Backend>) -> JoinHandle<()> {
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let event = match effect {
                SideEffect::LoadFeedback(job_id) => match backend.fetch_analysis(&job_id).await {
                    Ok(report) => Event::FeedbackLoaded {
                        feedback: AnalyticsDeriver::derive(&report),
                        job_id,
                    },
                    Err(e) => Event::RequestFailed { job_id, kind: RequestKind::Feedback, reason: e.to_string() },
                },
                SideEffect::LoadAudio(job_id) => match backend.fetch_audio(&job_id).await {
                    Ok(bytes) => Event::AudioLoaded { job_id, bytes },
                    Err(e) => Event::RequestFailed { job_id, kind: RequestKind::Audio, reason: e.to_string() },
                },
                SideEffect::DeleteJob(job_id) => match backend.delete_job(&job_id).await {
                    Ok(()) => Event::JobDeleted { job_id },
                    Err(e) => Event::RequestFailed { job_id, kind: RequestKind::Delete, reason: e.to_string() },
                },
            };

            if tx.send(event).await.is_err() {
                debug!("Session closed before a request completed");
            }
        })
    }

    /// Async driver loop. Returns when the command channel closes.
    pub async fn run(&mut self, backend: Arc<dyn Backend>, mut commands: mpsc::Receiver<Command>) {
        info!("Session started");

        loop {
            let effects = tokio::select! {
                Some(event) = self.receiver.recv() => {
                    let mut events = vec![event];
                    while let Ok(more) = self.receiver.try_recv() {
                        events.push(more);
                    }
                    self.step(events)
                }
                command = commands.recv() => match command {
                    Some(command) => self.command(command).unwrap_or_else(|e| {
                        warn!("Command rejected: {}", e);
                        Vec::new()
                    }),
                    None => break,
                },
            };

            for effect in effects {
                self.execute(effect, backend.clone());
            }
        }

        info!("Session stopped");
    }
}
