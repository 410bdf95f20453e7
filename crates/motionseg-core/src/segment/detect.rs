use tracing::debug;

use crate::pipeline::config::DetectionConfig;

use super::Segment;

/// Maximal runs of consecutive frames with `score >= sensitivity`.
pub fn threshold_segments(scores: &[f64], sensitivity: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &score) in scores.iter().enumerate() {
        let in_motion = score >= sensitivity;
        match (in_motion, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                segments.push(Segment { start, end: i - 1 });
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        segments.push(Segment {
            start,
            end: scores.len() - 1,
        });
    }
    segments
}

/// Join segments separated by at most `merge_gap_frames` still frames.
///
/// Touching (gap 0) and overlapping (negative gap) segments always join.
pub fn merge_close_segments(segments: &[Segment], merge_gap_frames: usize) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());

    for seg in segments {
        match merged.last_mut() {
            Some(current) if current.gap_to(seg) <= merge_gap_frames as i64 => {
                current.end = current.end.max(seg.end);
            }
            _ => merged.push(*seg),
        }
    }
    merged
}

/// Drop segments shorter than `min_segment_frames`.
pub fn filter_short_segments(segments: Vec<Segment>, min_segment_frames: usize) -> Vec<Segment> {
    segments
        .into_iter()
        .filter(|s| s.length() >= min_segment_frames)
        .collect()
}

/// Threshold, merge, then filter a score sequence into the final segment list.
///
/// The result is sorted by start, pairwise disjoint, separated by more than
/// `merge_gap_frames`, and every segment is at least `min_segment_frames` long.
pub fn detect_segments(scores: &[f64], config: &DetectionConfig) -> Vec<Segment> {
    let raw = threshold_segments(scores, config.sensitivity);
    let merged = merge_close_segments(&raw, config.merge_gap_frames);
    let merged_count = merged.len();
    let kept = filter_short_segments(merged, config.min_segment_frames);
    debug!(
        raw = raw.len(),
        merged = merged_count,
        kept = kept.len(),
        sensitivity = config.sensitivity,
        "Segmented score sequence"
    );
    kept
}
