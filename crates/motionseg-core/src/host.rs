//! Annotation hosts (editing timelines, clips) seen through an explicit
//! capability interface.

use tracing::debug;

use crate::consts::MARKER_PREFIX;
use crate::range::{in_motion, FrameRange};
use crate::segment::Segment;

/// A timeline or clip annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Position, relative to the start of the annotated target.
    pub frame: i64,
    /// Span in frames; values below 1 are read as 1.
    pub duration: i64,
    pub color: String,
    pub name: String,
    pub note: String,
}

impl Marker {
    pub fn is_motion_marker(&self) -> bool {
        self.name.starts_with(MARKER_PREFIX)
    }

    pub fn range(&self, base: i64) -> FrameRange {
        FrameRange::from_duration(base + self.frame, self.duration)
    }
}

/// Something that holds markers. Each method reports whether the host accepted it.
pub trait MarkerTarget {
    fn markers(&self) -> Vec<Marker>;
    fn delete_marker(&mut self, frame: i64) -> bool;
    fn add_marker(&mut self, marker: &Marker) -> bool;
}

/// Marker target held in memory; at most one marker per frame.
#[derive(Clone, Debug, Default)]
pub struct MemoryMarkerTarget {
    markers: Vec<Marker>,
}

impl MarkerTarget for MemoryMarkerTarget {
    fn markers(&self) -> Vec<Marker> {
        self.markers.clone()
    }

    fn delete_marker(&mut self, frame: i64) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.frame != frame);
        self.markers.len() != before
    }

    fn add_marker(&mut self, marker: &Marker) -> bool {
        if self.markers.iter().any(|m| m.frame == marker.frame) {
            return false;
        }
        self.markers.push(marker.clone());
        self.markers.sort_by_key(|m| m.frame);
        true
    }
}

/// Label of the `index`th segment marker, e.g. `"[DSU] seg 003: 120-164"`.
pub fn segment_marker_name(index: usize, segment: &Segment) -> String {
    format!(
        "{MARKER_PREFIX} seg {index:03}: {}-{}",
        segment.start(),
        segment.end()
    )
}

/// Remove every marker this tool placed earlier. Returns how many went away.
pub fn clear_motion_markers(target: &mut dyn MarkerTarget) -> usize {
    let stale: Vec<i64> = target
        .markers()
        .iter()
        .filter(|m| m.is_motion_marker())
        .map(|m| m.frame)
        .collect();
    stale
        .into_iter()
        .filter(|&frame| target.delete_marker(frame))
        .count()
}

/// Add one marker per segment spanning its frames. Returns how many the host accepted.
pub fn place_segment_markers(
    target: &mut dyn MarkerTarget,
    segments: &[Segment],
    color: &str,
) -> usize {
    let added = segments
        .iter()
        .enumerate()
        .filter(|(idx, seg)| {
            target.add_marker(&Marker {
                frame: seg.start() as i64,
                duration: seg.length() as i64,
                color: color.to_string(),
                name: segment_marker_name(*idx, seg),
                note: format!("len {} frames", seg.length()),
            })
        })
        .count();
    debug!(segments = segments.len(), added, "Placed segment markers");
    added
}

/// Absolute ranges covered by markers, sorted. With `motion_only`, markers not
/// placed by this tool are ignored.
pub fn ranges_from_markers(markers: &[Marker], base: i64, motion_only: bool) -> Vec<FrameRange> {
    let mut ranges: Vec<FrameRange> = markers
        .iter()
        .filter(|m| !motion_only || m.is_motion_marker())
        .map(|m| m.range(base))
        .collect();
    ranges.sort();
    ranges
}

/// Pair each clip span with whether it intersects any motion range.
pub fn classify_clips(clips: &[FrameRange], motion: &[FrameRange]) -> Vec<(FrameRange, bool)> {
    clips.iter().map(|c| (*c, in_motion(c, motion))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_marker(frame: i64) -> Marker {
        Marker {
            frame,
            duration: 1,
            color: "Red".into(),
            name: "note to self".into(),
            note: String::new(),
        }
    }

    #[test]
    fn test_place_then_clear_leaves_user_markers() {
        let mut target = MemoryMarkerTarget::default();
        assert!(target.add_marker(&user_marker(50)));

        let segs = vec![Segment::new(2, 3).unwrap(), Segment::new(10, 19).unwrap()];
        assert_eq!(place_segment_markers(&mut target, &segs, "Blue"), 2);

        let markers = target.markers();
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].name, "[DSU] seg 000: 2-3");
        assert_eq!(markers[0].note, "len 2 frames");
        assert_eq!(markers[1].duration, 10);

        assert_eq!(clear_motion_markers(&mut target), 2);
        assert_eq!(target.markers(), vec![user_marker(50)]);
    }

    #[test]
    fn test_rejected_marker_not_counted() {
        let mut target = MemoryMarkerTarget::default();
        target.add_marker(&user_marker(2));
        let segs = vec![Segment::new(2, 3).unwrap()];
        assert_eq!(place_segment_markers(&mut target, &segs, "Blue"), 0);
    }

    #[test]
    fn test_ranges_from_markers() {
        let mut target = MemoryMarkerTarget::default();
        place_segment_markers(
            &mut target,
            &[Segment::new(10, 14).unwrap(), Segment::new(0, 1).unwrap()],
            "Blue",
        );
        target.add_marker(&Marker {
            duration: 0,
            ..user_marker(30)
        });

        let all = ranges_from_markers(&target.markers(), 100, false);
        assert_eq!(
            all,
            vec![
                FrameRange::new(100, 101),
                FrameRange::new(110, 114),
                FrameRange::new(130, 130)
            ]
        );
        assert_eq!(ranges_from_markers(&target.markers(), 100, true).len(), 2);
    }

    #[test]
    fn test_classify_clips() {
        let motion = vec![FrameRange::new(10, 20)];
        let clips = vec![FrameRange::new(0, 9), FrameRange::new(15, 30)];
        let flags: Vec<bool> = classify_clips(&clips, &motion).into_iter().map(|(_, f)| f).collect();
        assert_eq!(flags, vec![false, true]);
    }
}
