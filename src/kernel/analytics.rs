//! Analytics derivation: raw per-segment scores -> classified feedback.
//!
//! Pure and total. Missing or zero inputs degrade to zero/empty results.
//! Thresholds are relative to the report's own averages and are fixed constants.

use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use super::report::{AnalysisReport, UNKNOWN_EMOTION};

pub const SLOW_PACING_FACTOR: f64 = 0.7;
pub const FAST_PACING_FACTOR: f64 = 1.3;
pub const QUIET_VOLUME_FACTOR: f64 = 0.9;
pub const LOUD_VOLUME_FACTOR: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacingClass {
    Slow,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeClass {
    Quiet,
    Loud,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillerSegment {
    pub start: f64,
    pub end: f64,
    pub fillers: u32,
}

/// A segment that fell outside the normal band, with its time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedSegment<C> {
    pub start: f64,
    pub end: f64,
    pub class: C,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PacingStats {
    pub average: f64,
    pub fast: usize,
    pub slow: usize,
    pub segments: Vec<FlaggedSegment<PacingClass>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumeStats {
    pub average: f64,
    pub loud: usize,
    pub quiet: usize,
    pub segments: Vec<FlaggedSegment<VolumeClass>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedFeedback {
    pub total_filler_words: u64,
    pub filler_segments: Vec<FillerSegment>,
    /// Totals per filler word across all segments, sorted by word.
    pub filler_words: BTreeMap<String, u64>,
    pub dominant_emotion: String,
    /// In first-encountered order.
    pub emotions: Vec<EmotionCount>,
    pub pacing: PacingStats,
    pub volume: VolumeStats,
    pub total_segments: usize,
    pub summary_text: String,
}

impl Default for ClassifiedFeedback {
    fn default() -> Self {
        Self {
            total_filler_words: 0,
            filler_segments: Vec::new(),
            filler_words: BTreeMap::new(),
            dominant_emotion: UNKNOWN_EMOTION.to_string(),
            emotions: Vec::new(),
            pacing: PacingStats::default(),
            volume: VolumeStats::default(),
            total_segments: 0,
            summary_text: String::new(),
        }
    }
}

impl ClassifiedFeedback {
    pub fn emotion_count(&self, label: &str) -> usize {
        self.emotions
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.count)
            .unwrap_or(0)
    }
}

pub struct AnalyticsDeriver;

impl AnalyticsDeriver {
    /// Pure projection: AnalysisReport -> ClassifiedFeedback.
    pub fn derive(report: &AnalysisReport) -> ClassifiedFeedback {
        let mut out = ClassifiedFeedback {
            total_segments: report.segments.len(),
            summary_text: report.summary_text.clone(),
            ..ClassifiedFeedback::default()
        };
        out.pacing.average = report.average_pacing;
        out.volume.average = report.average_volume;

        let slow_below = report.average_pacing * SLOW_PACING_FACTOR;
        let fast_above = report.average_pacing * FAST_PACING_FACTOR;
        let quiet_below = report.average_volume * QUIET_VOLUME_FACTOR;
        let loud_above = report.average_volume * LOUD_VOLUME_FACTOR;

        for segment in &report.segments {
            // 1. Fillers
            if segment.filler_count > 0 {
                out.total_filler_words += u64::from(segment.filler_count);
                out.filler_segments.push(FillerSegment {
                    start: segment.start,
                    end: segment.end,
                    fillers: segment.filler_count,
                });
            }
            for (word, count) in &segment.filler_words {
                *out.filler_words.entry(word.clone()).or_insert(0) += u64::from(*count);
            }

            // 2. Emotion tally
            let label = if segment.emotion_label.trim().is_empty() {
                UNKNOWN_EMOTION
            } else {
                segment.emotion_label.as_str()
            };
            match out.emotions.iter_mut().find(|e| e.label == label) {
                Some(entry) => entry.count += 1,
                None => out.emotions.push(EmotionCount { label: label.to_string(), count: 1 }),
            }

            // 3. Pacing (strict comparisons)
            let pacing = if segment.pacing < slow_below {
                Some(PacingClass::Slow)
            } else if segment.pacing > fast_above {
                Some(PacingClass::Fast)
            } else {
                None
            };
            if let Some(class) = pacing {
                match class {
                    PacingClass::Slow => out.pacing.slow += 1,
                    PacingClass::Fast => out.pacing.fast += 1,
                }
                out.pacing.segments.push(FlaggedSegment { start: segment.start, end: segment.end, class });
            }

            // 4. Volume (strict comparisons)
            let volume = if segment.volume < quiet_below {
                Some(VolumeClass::Quiet)
            } else if segment.volume > loud_above {
                Some(VolumeClass::Loud)
            } else {
                None
            };
            if let Some(class) = volume {
                match class {
                    VolumeClass::Quiet => out.volume.quiet += 1,
                    VolumeClass::Loud => out.volume.loud += 1,
                }
                out.volume.segments.push(FlaggedSegment { start: segment.start, end: segment.end, class });
            }
        }

        // Highest tally wins; ties go to the label seen first.
        let mut best: Option<&EmotionCount> = None;
        for entry in &out.emotions {
            if best.map_or(true, |b| entry.count > b.count) {
                best = Some(entry);
            }
        }
        if let Some(best) = best {
            out.dominant_emotion = best.label.clone();
        }

        out
    }
}
