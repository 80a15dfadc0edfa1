use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

pub const UNKNOWN_EMOTION: &str = "unknown";

/// One fixed time window of a recording as scored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Seconds from the start of the recording.
    pub start: f64,
    pub end: f64,
    /// Words per second.
    pub pacing: f64,
    /// Backend-defined loudness scale (RMS of the raw samples).
    pub volume: f64,
    pub filler_count: u32,
    /// Per-word breakdown of `filler_count`, when the backend supplies one.
    pub filler_words: BTreeMap<String, u32>,
    pub emotion_label: String,
    pub text: Option<String>,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            pacing: 0.0,
            volume: 0.0,
            filler_count: 0,
            filler_words: BTreeMap::new(),
            emotion_label: UNKNOWN_EMOTION.to_string(),
            text: None,
        }
    }

    pub fn pacing(mut self, pacing: f64) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn fillers(mut self, count: u32) -> Self {
        self.filler_count = count;
        self
    }

    pub fn emotion(mut self, label: impl Into<String>) -> Self {
        self.emotion_label = label.into();
        self
    }
}

/// Produced once per completed job. Averages are the backend's, not recomputed here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Ordered by `start`.
    pub segments: Vec<Segment>,
    pub average_volume: f64,
    pub average_pacing: f64,
    /// Free-form coaching text. Opaque.
    pub summary_text: String,
}
