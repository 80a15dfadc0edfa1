#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use podium::error::BackendError;
use podium::kernel::job::{Job, JobId, JobStatus};
use podium::kernel::report::{AnalysisReport, Segment};
use podium::services::backend::Backend;
use podium::AudioArtifact;

/// How the next `list_jobs` call behaves.
#[derive(Debug, Clone, Copy)]
pub enum ListBehavior {
    Respond,
    Fail,
    Hang,
    Delay(Duration),
}

/// In-memory stand-in for the analysis backend.
#[derive(Default)]
pub struct FakeBackend {
    jobs: Mutex<Vec<Job>>,
    reports: Mutex<HashMap<JobId, AnalysisReport>>,
    list_script: Mutex<VecDeque<ListBehavior>>,
    next_upload_id: Mutex<Option<String>>,
    reject_uploads: Mutex<bool>,
    pub list_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub analysis_calls: AtomicUsize,
    pub audio_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_jobs(&self, jobs: Vec<Job>) {
        *self.jobs.lock().unwrap() = jobs;
    }

    pub fn set_status(&self, id: &str, status: JobStatus) {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|job| job.id.as_str() == id) {
            job.status = status;
        }
    }

    pub fn set_report(&self, id: &str, report: AnalysisReport) {
        self.reports.lock().unwrap().insert(JobId::from(id), report);
    }

    pub fn script_list(&self, behaviors: impl IntoIterator<Item = ListBehavior>) {
        self.list_script.lock().unwrap().extend(behaviors);
    }

    pub fn set_next_upload_id(&self, id: &str) {
        *self.next_upload_id.lock().unwrap() = Some(id.to_string());
    }

    pub fn reject_uploads(&self) {
        *self.reject_uploads.lock().unwrap() = true;
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_jobs(&self) -> Result<Vec<Job>, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.list_script.lock().unwrap().pop_front().unwrap_or(ListBehavior::Respond);

        match behavior {
            ListBehavior::Respond => {}
            ListBehavior::Fail => {
                return Err(BackendError::Status { endpoint: "all-analyses".to_string(), status: 503 })
            }
            ListBehavior::Hang => std::future::pending::<()>().await,
            ListBehavior::Delay(delay) => tokio::time::sleep(delay).await,
        }
        Ok(self.jobs())
    }

    async fn upload(&self, artifact: &AudioArtifact) -> Result<JobId, BackendError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if *self.reject_uploads.lock().unwrap() {
            return Err(BackendError::Status { endpoint: "upload".to_string(), status: 500 });
        }

        let id = self
            .next_upload_id
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.jobs
            .lock()
            .unwrap()
            .push(Job::new(id.as_str(), artifact.file_name.as_str(), JobStatus::Processing));
        Ok(JobId::new(id))
    }

    async fn fetch_analysis(&self, job_id: &JobId) -> Result<AnalysisReport, BackendError> {
        self.analysis_calls.fetch_add(1, Ordering::SeqCst);
        self.reports
            .lock()
            .unwrap()
            .get(job_id)
            .cloned()
            .ok_or_else(|| BackendError::NotReady { job_id: job_id.clone(), status: "processing".to_string() })
    }

    async fn fetch_audio(&self, _job_id: &JobId) -> Result<Vec<u8>, BackendError> {
        self.audio_calls.fetch_add(1, Ordering::SeqCst);
        Ok(b"RIFF....WAVE".to_vec())
    }

    async fn delete_job(&self, job_id: &JobId) -> Result<(), BackendError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|job| &job.id != job_id);
        if jobs.len() == before {
            return Err(BackendError::Status { endpoint: format!("delete-file/{}", job_id), status: 404 });
        }
        Ok(())
    }
}

pub fn job(id: &str, status: JobStatus) -> Job {
    Job::new(id, format!("{}.wav", id), status)
}

/// The single-segment report from the end-to-end walkthrough.
pub fn calm_report() -> AnalysisReport {
    AnalysisReport {
        segments: vec![Segment::new(0.0, 5.0).pacing(1.0).volume(10.0).fillers(2).emotion("calm")],
        average_volume: 10.0,
        average_pacing: 2.0,
        summary_text: "Breathe between sentences.".to_string(),
    }
}
