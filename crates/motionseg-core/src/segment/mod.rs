pub mod detect;

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};

pub use detect::{detect_segments, filter_short_segments, merge_close_segments, threshold_segments};

/// A closed frame interval classified as motion. `end >= start`.
///
/// Only [`Segment::new`] and deserialization construct one:
///
/// ```compile_fail
/// let _ = motionseg_core::segment::Segment { start: 5, end: 2 };
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment {
    start: usize,
    end: usize,
}

impl Segment {
    /// Build a segment, rejecting `end < start`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if end < start {
            return Err(MotionError::InvalidSegment { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn length(&self) -> usize {
        self.end - self.start + 1
    }

    /// Still frames strictly between `self` and a later segment.
    /// Negative when the two overlap.
    pub fn gap_to(&self, next: &Segment) -> i64 {
        next.start as i64 - self.end as i64 - 1
    }
}

/// External `{start, end, length}` form of a [`Segment`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub length: Option<usize>,
}

impl From<&Segment> for SegmentRecord {
    fn from(seg: &Segment) -> Self {
        Self {
            start: seg.start,
            end: seg.end,
            length: Some(seg.length()),
        }
    }
}

impl TryFrom<SegmentRecord> for Segment {
    type Error = MotionError;

    /// `length` is redundant and recomputed; only start/end are trusted.
    fn try_from(record: SegmentRecord) -> Result<Self> {
        Segment::new(record.start, record.end)
    }
}

impl Serialize for Segment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SegmentRecord::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let record = SegmentRecord::deserialize(deserializer)?;
        Segment::try_from(record).map_err(serde::de::Error::custom)
    }
}

/// Total number of frames covered by a list of disjoint segments.
pub fn total_frames(segments: &[Segment]) -> usize {
    segments.iter().map(Segment::length).sum()
}
