//! Translation of detected segments into frame ranges of an external
//! coordinate space (timeline or clip-relative), plus the interval helpers
//! downstream consumers need.

use serde::{Deserialize, Serialize};

use crate::segment::Segment;

/// Inclusive frame range in an external coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

/// What to do with a range that leaves the valid span of its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpanPolicy {
    /// Drop any range not entirely inside the span.
    #[default]
    Reject,
    /// Trim the range to the span; drop it only if nothing remains.
    Clamp,
}

impl FrameRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// A range starting at `start` covering `duration` frames (at least one).
    pub fn from_duration(start: i64, duration: i64) -> Self {
        Self::new(start, start + duration.max(1) - 1)
    }

    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }

    pub fn is_valid(&self) -> bool {
        self.end >= self.start
    }

    /// True when the two closed ranges share at least one frame.
    pub fn overlaps(&self, other: &FrameRange) -> bool {
        !(self.end < other.start || other.end < self.start)
    }

    pub fn contains(&self, other: &FrameRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Fit this range into `span` according to `policy`.
    pub fn fit_to(&self, span: &FrameRange, policy: SpanPolicy) -> Option<FrameRange> {
        match policy {
            SpanPolicy::Reject => span.contains(self).then_some(*self),
            SpanPolicy::Clamp => {
                let clamped = FrameRange::new(self.start.max(span.start), self.end.min(span.end));
                clamped.is_valid().then_some(clamped)
            }
        }
    }
}

impl std::fmt::Display for FrameRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl Segment {
    /// Shift into an external space whose frame 0 sits at `offset`.
    pub fn to_range(&self, offset: i64) -> FrameRange {
        FrameRange::new(offset + self.start() as i64, offset + self.end() as i64)
    }
}

pub fn ranges_from_segments(segments: &[Segment], offset: i64) -> Vec<FrameRange> {
    segments.iter().map(|s| s.to_range(offset)).collect()
}

/// Translate segments and fit each into `span`, dropping those the policy rejects.
pub fn fit_segments(
    segments: &[Segment],
    offset: i64,
    span: &FrameRange,
    policy: SpanPolicy,
) -> Vec<FrameRange> {
    segments
        .iter()
        .filter_map(|s| s.to_range(offset).fit_to(span, policy))
        .collect()
}

/// True when `range` intersects any of `motion`.
pub fn in_motion(range: &FrameRange, motion: &[FrameRange]) -> bool {
    motion.iter().any(|m| m.overlaps(range))
}

/// Every frame of every well-formed range, in range order.
pub fn expand_frames(ranges: &[FrameRange]) -> Vec<i64> {
    ranges
        .iter()
        .filter(|r| r.is_valid())
        .flat_map(|r| r.start..=r.end)
        .collect()
}

/// Map clip-relative frames into source-media frames.
///
/// Frames outside `[0, clip_duration)` are dropped; the rest are shifted by
/// the clip's trim offset into its source media.
pub fn source_frames(frames: &[i64], clip_duration: i64, left_offset: i64) -> Vec<i64> {
    frames
        .iter()
        .filter(|&&f| f >= 0 && f < clip_duration)
        .map(|&f| left_offset + f)
        .collect()
}

/// Absolute cut positions for clip-relative frames.
///
/// A cut is only meaningful strictly inside the clip, so positions landing on
/// the first or last frame (or outside) are dropped. Sorted and deduplicated.
pub fn cut_points(frames: &[i64], clip_start: i64, clip_duration: i64) -> Vec<i64> {
    let clip_end = clip_start + clip_duration - 1;
    let mut cuts: Vec<i64> = frames
        .iter()
        .map(|&f| clip_start + f)
        .filter(|&abs| abs > clip_start && abs < clip_end)
        .collect();
    cuts.sort_unstable();
    cuts.dedup();
    cuts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: i64, end: i64) -> FrameRange {
        FrameRange::new(start, end)
    }

    #[test]
    fn test_overlap_predicate() {
        assert!(r(0, 5).overlaps(&r(5, 9)));
        assert!(r(3, 4).overlaps(&r(0, 10)));
        assert!(!r(0, 4).overlaps(&r(5, 9)));
        assert!(!r(10, 12).overlaps(&r(0, 9)));
    }

    #[test]
    fn test_translate_is_pure_shift() {
        let seg = Segment::new(2, 3).unwrap();
        assert_eq!(seg.to_range(100), r(102, 103));
        assert_eq!(seg.to_range(-2), r(0, 1));
    }

    #[test]
    fn test_fit_policies() {
        let span = r(0, 99);
        assert_eq!(r(90, 120).fit_to(&span, SpanPolicy::Reject), None);
        assert_eq!(r(90, 120).fit_to(&span, SpanPolicy::Clamp), Some(r(90, 99)));
        assert_eq!(r(150, 160).fit_to(&span, SpanPolicy::Clamp), None);
        assert_eq!(r(10, 20).fit_to(&span, SpanPolicy::Reject), Some(r(10, 20)));
    }

    #[test]
    fn test_expand_skips_inverted() {
        assert_eq!(expand_frames(&[r(1, 3), r(9, 8), r(5, 5)]), vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_source_frames_respect_clip_bounds() {
        assert_eq!(source_frames(&[-1, 0, 4, 5, 9], 5, 100), vec![100, 104]);
    }

    #[test]
    fn test_cut_points_strictly_interior() {
        // clip spans 10..=19
        assert_eq!(cut_points(&[0, 3, 3, 9, 1, 12], 10, 10), vec![11, 13]);
    }

    #[test]
    fn test_from_duration_minimum_one() {
        assert_eq!(FrameRange::from_duration(7, 0), r(7, 7));
        assert_eq!(FrameRange::from_duration(7, 3), r(7, 9));
    }
}
