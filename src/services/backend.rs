//! Analysis backend boundary.
//!
//! The backend accepts a recording, analyses it in the background and exposes
//! the job list, the finished report and the original audio.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use reqwest::{Client, Response};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::BackendError;
use crate::kernel::job::{Job, JobId, JobStatus};
use crate::kernel::report::{AnalysisReport, Segment, UNKNOWN_EMOTION};
use crate::services::upload::AudioArtifact;

const USER_AGENT: &str = concat!("podium/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Backend: Send + Sync {
    /// Every job the backend knows about.
    async fn list_jobs(&self) -> Result<Vec<Job>, BackendError>;

    /// Submit a recording. Returns the backend-assigned id.
    async fn upload(&self, artifact: &AudioArtifact) -> Result<JobId, BackendError>;

    /// The finished report. Fails with `NotReady` / `Failed` for unfinished jobs.
    async fn fetch_analysis(&self, job_id: &JobId) -> Result<AnalysisReport, BackendError>;

    /// Raw audio bytes, passed through untouched.
    async fn fetch_audio(&self, job_id: &JobId) -> Result<Vec<u8>, BackendError>;

    async fn delete_job(&self, job_id: &JobId) -> Result<(), BackendError>;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Self {
        // No request timeout: a hung fetch only delays its own tick.
        let client = Client::builder().user_agent(USER_AGENT).build().unwrap_or_else(|e| {
            warn!("HTTP client setup failed ({}); using reqwest defaults", e);
            Client::default()
        });
        Self { client, config }
    }

    fn check(&self, endpoint: &str, response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn get(&self, path: &str) -> Result<Response, BackendError> {
        let response = self.client.get(self.config.endpoint(path)).send().await?;
        self.check(path, response)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_jobs(&self) -> Result<Vec<Job>, BackendError> {
        let body = self.get("all-analyses").await?.bytes().await?;
        parse_job_list(&body)
    }

    async fn upload(&self, artifact: &AudioArtifact) -> Result<JobId, BackendError> {
        let part = reqwest::multipart::Part::bytes(artifact.bytes.clone())
            .file_name(artifact.file_name.clone())
            .mime_str(AudioArtifact::CONTENT_TYPE)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.config.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let body = self.check("upload", response)?.bytes().await?;
        parse_upload_ack(&body)
    }

    async fn fetch_analysis(&self, job_id: &JobId) -> Result<AnalysisReport, BackendError> {
        let body = self
            .get(&format!("fetch-analysis/{}", job_id))
            .await?
            .bytes()
            .await?;
        parse_analysis(job_id, &body)
    }

    async fn fetch_audio(&self, job_id: &JobId) -> Result<Vec<u8>, BackendError> {
        let body = self.get(&format!("fetch-audio/{}", job_id)).await?.bytes().await?;
        debug!("Fetched {} bytes of audio for {}", body.len(), job_id);
        Ok(body.to_vec())
    }

    async fn delete_job(&self, job_id: &JobId) -> Result<(), BackendError> {
        let path = format!("delete-file/{}", job_id);
        let response = self.client.delete(self.config.endpoint(&path)).send().await?;
        self.check(&path, response)?;
        Ok(())
    }
}

// --- Wire schema ---

#[derive(Deserialize)]
struct TaskList {
    #[serde(default)]
    tasks: Vec<TaskRecord>,
}

#[derive(Deserialize)]
struct TaskRecord {
    task_id: String,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    uploaded_at: Option<NaiveDateTime>,
    #[serde(default)]
    status: Option<String>,
}

impl From<TaskRecord> for Job {
    fn from(record: TaskRecord) -> Self {
        Job {
            id: JobId::new(record.task_id),
            display_name: record.file_name.unwrap_or_default(),
            status: record
                .status
                .as_deref()
                .map(JobStatus::parse)
                .unwrap_or(JobStatus::Pending),
            duration_seconds: record.duration,
            submitted_at: record.uploaded_at,
        }
    }
}

#[derive(Deserialize)]
struct UploadAck {
    task_id: String,
}

#[derive(Deserialize)]
struct AnalysisEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Option<AnalysisResults>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct AnalysisResults {
    #[serde(default)]
    segments: Vec<SegmentRecord>,
    #[serde(default, deserialize_with = "lenient_number")]
    average_pacing: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    average_volume: f64,
    #[serde(default)]
    summarized_feedback: Option<String>,
}

#[derive(Deserialize)]
struct SegmentRecord {
    #[serde(default, deserialize_with = "lenient_number")]
    start: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    end: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pacing: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    volume: f64,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    emotion_analysis: Option<EmotionRecord>,
    #[serde(default)]
    filler_analysis: Option<FillerRecord>,
}

#[derive(Deserialize)]
struct EmotionRecord {
    #[serde(default)]
    predicted_emotion: Option<String>,
}

#[derive(Deserialize)]
struct FillerRecord {
    #[serde(default, deserialize_with = "lenient_number")]
    total_fillers: f64,
    #[serde(default)]
    filler_counts: BTreeMap<String, Value>,
}

impl From<SegmentRecord> for Segment {
    fn from(record: SegmentRecord) -> Self {
        let (filler_count, filler_words) = match record.filler_analysis {
            Some(fillers) => {
                let words = fillers
                    .filler_counts
                    .into_iter()
                    .filter_map(|(word, count)| {
                        let count = as_count(count.as_f64().unwrap_or(0.0));
                        (count > 0).then_some((word, count))
                    })
                    .collect();
                (as_count(fillers.total_fillers), words)
            }
            None => (0, BTreeMap::new()),
        };

        Segment {
            start: record.start,
            end: record.end,
            pacing: record.pacing,
            volume: record.volume,
            filler_count,
            filler_words,
            emotion_label: record
                .emotion_analysis
                .and_then(|e| e.predicted_emotion)
                .filter(|label| !label.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_EMOTION.to_string()),
            text: record.text,
        }
    }
}

impl From<AnalysisResults> for AnalysisReport {
    fn from(results: AnalysisResults) -> Self {
        let mut segments: Vec<Segment> = results.segments.into_iter().map(Segment::from).collect();
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));

        AnalysisReport {
            segments,
            average_volume: results.average_volume,
            average_pacing: results.average_pacing,
            summary_text: results.summarized_feedback.unwrap_or_default(),
        }
    }
}

fn as_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

pub(crate) fn parse_job_list(body: &[u8]) -> Result<Vec<Job>, BackendError> {
    let list: TaskList = serde_json::from_slice(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(list.tasks.into_iter().map(Job::from).collect())
}

pub(crate) fn parse_upload_ack(body: &[u8]) -> Result<JobId, BackendError> {
    let ack: UploadAck = serde_json::from_slice(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(JobId::new(ack.task_id))
}

pub(crate) fn parse_analysis(job_id: &JobId, body: &[u8]) -> Result<AnalysisReport, BackendError> {
    let envelope: AnalysisEnvelope =
        serde_json::from_slice(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    let status = envelope
        .status
        .as_deref()
        .map(JobStatus::parse)
        .unwrap_or(JobStatus::Completed);

    match (status, envelope.results) {
        (JobStatus::Failed, _) => Err(BackendError::Failed {
            job_id: job_id.clone(),
            reason: envelope.error.unwrap_or_else(|| "unspecified".to_string()),
        }),
        (JobStatus::Completed, Some(results)) => Ok(results.into()),
        (JobStatus::Completed, None) => Err(BackendError::Decode(format!(
            "analysis for {} is completed but carries no results",
            job_id
        ))),
        (status, _) => Err(BackendError::NotReady {
            job_id: job_id.clone(),
            status: status.to_string(),
        }),
    }
}

// --- Lenient scalars ---
// The backend emits Python-side values: floats where ints are expected,
// `null`, or the literal string "Unknown".

fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value).unwrap_or(0.0))
}

fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value)
        .filter(|secs| *secs >= 0.0)
        .map(|secs| secs.round() as u64))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(raw) => Ok(parse_timestamp(&raw)),
        _ => Ok(None),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}
