use podium::kernel::analytics::{AnalyticsDeriver, FlaggedSegment, PacingClass, VolumeClass};
use podium::kernel::report::{AnalysisReport, Segment, UNKNOWN_EMOTION};

fn report(segments: Vec<Segment>, average_pacing: f64, average_volume: f64) -> AnalysisReport {
    AnalysisReport {
        segments,
        average_pacing,
        average_volume,
        summary_text: String::new(),
    }
}

#[test]
fn test_empty_report_yields_zeroes() {
    let feedback = AnalyticsDeriver::derive(&AnalysisReport::default());

    assert_eq!(feedback.total_filler_words, 0);
    assert!(feedback.filler_segments.is_empty());
    assert!(feedback.pacing.segments.is_empty());
    assert!(feedback.volume.segments.is_empty());
    assert_eq!(feedback.pacing.fast + feedback.pacing.slow, 0);
    assert_eq!(feedback.volume.loud + feedback.volume.quiet, 0);
    assert_eq!(feedback.dominant_emotion, UNKNOWN_EMOTION, "No segments means no emotion claim");
    assert_eq!(feedback.total_segments, 0);
}

#[test]
fn test_single_calm_segment_walkthrough() {
    let input = AnalysisReport {
        segments: vec![Segment::new(0.0, 5.0).pacing(1.0).volume(10.0).fillers(2).emotion("calm")],
        average_pacing: 2.0,
        average_volume: 10.0,
        summary_text: "Pause instead of saying um.".to_string(),
    };

    let feedback = AnalyticsDeriver::derive(&input);

    assert_eq!(feedback.total_filler_words, 2);
    assert_eq!(feedback.filler_segments.len(), 1);
    assert_eq!(feedback.filler_segments[0].start, 0.0);
    assert_eq!(feedback.filler_segments[0].end, 5.0);

    // 1.0 < 2.0 * 0.7
    assert_eq!(feedback.pacing.slow, 1);
    assert_eq!(feedback.pacing.fast, 0);
    assert_eq!(
        feedback.pacing.segments,
        vec![FlaggedSegment { start: 0.0, end: 5.0, class: PacingClass::Slow }]
    );

    // 10 sits inside the 9..11 band.
    assert!(feedback.volume.segments.is_empty(), "Volume within band must stay unclassified");
    assert_eq!(feedback.dominant_emotion, "calm");
    assert_eq!(feedback.summary_text, "Pause instead of saying um.", "Summary text passes through untouched");
}

#[test]
fn test_pacing_threshold_is_strict() {
    let average = 2.0;
    let on_boundary = Segment::new(0.0, 1.0).pacing(average * 0.7).volume(1.0);
    let just_below = Segment::new(1.0, 2.0).pacing(average * 0.6999).volume(1.0);
    let fast_boundary = Segment::new(2.0, 3.0).pacing(average * 1.3).volume(1.0);

    let feedback = AnalyticsDeriver::derive(&report(vec![on_boundary, just_below, fast_boundary], average, 1.0));

    assert_eq!(feedback.pacing.slow, 1, "Only the value strictly below the boundary is slow");
    assert_eq!(feedback.pacing.segments[0].start, 1.0);
    assert_eq!(feedback.pacing.fast, 0, "Exactly 1.3x is not fast");
}

#[test]
fn test_volume_classification() {
    let segments = vec![
        Segment::new(0.0, 1.0).volume(8.9).pacing(1.0),
        Segment::new(1.0, 2.0).volume(9.0).pacing(1.0),
        Segment::new(2.0, 3.0).volume(11.0).pacing(1.0),
        Segment::new(3.0, 4.0).volume(11.5).pacing(1.0),
    ];

    let feedback = AnalyticsDeriver::derive(&report(segments, 1.0, 10.0));

    assert_eq!(feedback.volume.quiet, 1);
    assert_eq!(feedback.volume.loud, 1);
    let classes: Vec<VolumeClass> = feedback.volume.segments.iter().map(|s| s.class).collect();
    assert_eq!(classes, vec![VolumeClass::Quiet, VolumeClass::Loud]);
    assert_eq!(feedback.volume.segments[1].start, 3.0);
}

#[test]
fn test_zero_averages_flag_every_nonzero_value() {
    let segments = vec![
        Segment::new(0.0, 1.0).pacing(0.5).volume(3.0),
        Segment::new(1.0, 2.0).pacing(0.0).volume(0.0),
    ];

    let feedback = AnalyticsDeriver::derive(&report(segments, 0.0, 0.0));

    assert_eq!(feedback.pacing.fast, 1);
    assert_eq!(feedback.pacing.slow, 0);
    assert_eq!(feedback.volume.loud, 1);
    assert_eq!(feedback.volume.quiet, 0);
}

#[test]
fn test_dominant_emotion_tie_goes_to_first_seen() {
    let segments = vec![
        Segment::new(0.0, 1.0).emotion("anxious"),
        Segment::new(1.0, 2.0).emotion("neutral"),
        Segment::new(2.0, 3.0).emotion("neutral"),
        Segment::new(3.0, 4.0).emotion("anxious"),
    ];

    let feedback = AnalyticsDeriver::derive(&report(segments, 1.0, 1.0));

    assert_eq!(feedback.dominant_emotion, "anxious");
    assert_eq!(feedback.emotion_count("anxious"), 2);
    assert_eq!(feedback.emotion_count("neutral"), 2);
    assert_eq!(feedback.emotions[0].label, "anxious", "Tallies keep first-encountered order");
}

#[test]
fn test_blank_emotion_counts_as_unknown() {
    let segments = vec![
        Segment::new(0.0, 1.0).emotion(""),
        Segment::new(1.0, 2.0).emotion("  "),
        Segment::new(2.0, 3.0).emotion("happy"),
    ];

    let feedback = AnalyticsDeriver::derive(&report(segments, 1.0, 1.0));

    assert_eq!(feedback.emotion_count(UNKNOWN_EMOTION), 2);
    assert_eq!(feedback.dominant_emotion, UNKNOWN_EMOTION);
}

#[test]
fn test_filler_words_are_totalled_per_word() {
    let mut first = Segment::new(0.0, 1.0).fillers(3);
    first.filler_words.insert("um".to_string(), 2);
    first.filler_words.insert("like".to_string(), 1);
    let mut second = Segment::new(1.0, 2.0).fillers(1);
    second.filler_words.insert("um".to_string(), 1);
    let clean = Segment::new(2.0, 3.0);

    let feedback = AnalyticsDeriver::derive(&report(vec![first, second, clean], 1.0, 1.0));

    assert_eq!(feedback.total_filler_words, 4);
    assert_eq!(feedback.filler_segments.len(), 2, "Segments without fillers are not flagged");
    assert_eq!(feedback.filler_words.get("um"), Some(&3));
    assert_eq!(feedback.filler_words.get("like"), Some(&1));
    assert_eq!(feedback.total_segments, 3);
}

#[test]
fn test_derivation_is_deterministic() {
    let segments = vec![
        Segment::new(0.0, 4.2).pacing(3.1).volume(910.0).fillers(1).emotion("happy"),
        Segment::new(4.2, 9.0).pacing(0.8).volume(402.5).emotion("sad"),
        Segment::new(9.0, 12.5).pacing(2.0).volume(1400.0).fillers(4).emotion("sad"),
    ];
    let input = report(segments, 1.97, 904.2);

    let first = AnalyticsDeriver::derive(&input);
    let second = AnalyticsDeriver::derive(&input);

    assert_eq!(first, second, "Same report must derive identical feedback");
    assert_eq!(first.dominant_emotion, "sad");
}
