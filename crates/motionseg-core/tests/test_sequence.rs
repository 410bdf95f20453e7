#[allow(dead_code)]
mod common;

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use std::path::PathBuf;

use motionseg_core::consts::FALLBACK_FPS;
use motionseg_core::error::{MotionError, Result};
use motionseg_core::frame::{ColorFrame, SourceInfo, SourceKind};
use motionseg_core::io::image_seq::ImageSequenceSource;
use motionseg_core::io::ser::SerSource;
use motionseg_core::io::FrameSource;
use motionseg_core::pipeline::config::{DetectionConfig, MotionMode};
use motionseg_core::pipeline::NoOpReporter;
use motionseg_core::sequence::{
    build_scores, build_scores_buffered, preprocess_strides, StrideFrames,
};

/// In-memory source of flat gray frames that can fail on demand.
struct ScriptedSource {
    levels: Vec<f32>,
    fail_grab_at: Option<usize>,
    fail_decode_at: Option<usize>,
    widen_from: Option<usize>,
    fps: Option<f64>,
    next: usize,
    grabbed: Option<usize>,
    decoded: Vec<usize>,
}

impl ScriptedSource {
    fn new(levels: Vec<f32>) -> Self {
        Self {
            levels,
            fail_grab_at: None,
            fail_decode_at: None,
            widen_from: None,
            fps: Some(24.0),
            next: 0,
            grabbed: None,
            decoded: Vec::new(),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            path: PathBuf::from("scripted"),
            kind: SourceKind::ImageSequence,
            width: 8,
            height: 8,
            frame_count: Some(self.levels.len()),
            fps: self.fps,
        }
    }

    fn grab(&mut self) -> Result<bool> {
        if Some(self.next) == self.fail_grab_at {
            return Err(MotionError::FrameDecode("grab failed".into()));
        }
        if self.next >= self.levels.len() {
            return Ok(false);
        }
        self.grabbed = Some(self.next);
        self.next += 1;
        Ok(true)
    }

    fn retrieve(&mut self) -> Result<ColorFrame> {
        let index = self.grabbed.ok_or(MotionError::NothingGrabbed)?;
        if Some(index) == self.fail_decode_at {
            return Err(MotionError::FrameDecode("corrupt".into()));
        }
        self.decoded.push(index);
        let width = match self.widen_from {
            Some(from) if index >= from => 10,
            _ => 8,
        };
        Ok(ColorFrame::from_gray(Array2::from_elem((8, width), self.levels[index])))
    }
}

fn global(n: usize) -> DetectionConfig {
    DetectionConfig {
        motion_mode: MotionMode::Global,
        sample_every_n: n,
        ..Default::default()
    }
}

#[test]
fn test_one_score_per_frame_and_frame_zero_is_zero() {
    let mut source = ScriptedSource::new(vec![0.0, 0.5, 0.5, 0.1]);
    let seq = build_scores(&mut source, &global(1), &NoOpReporter).unwrap();

    assert_eq!(seq.frame_count(), 4);
    assert_eq!(seq.scores[0], 0.0);
    assert_abs_diff_eq!(seq.scores[1], 0.5, epsilon = 1e-5);
    assert_abs_diff_eq!(seq.scores[2], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(seq.scores[3], 0.4, epsilon = 1e-5);
    assert_eq!(seq.fps, 24.0);
}

#[test]
fn test_stride_divides_and_replicates_including_partial_tail() {
    // 8 frames, stride 3: pairs (0,3), (3,6), (6,7).
    let levels = vec![0.0, 0.0, 0.0, 0.6, 0.6, 0.6, 0.0, 0.3];
    let mut source = ScriptedSource::new(levels);
    let seq = build_scores(&mut source, &global(3), &NoOpReporter).unwrap();

    assert_eq!(seq.frame_count(), 8);
    assert_eq!(source.decoded, vec![0, 3, 6, 7]);
    for i in 1..=3 {
        assert_abs_diff_eq!(seq.scores[i], 0.2, epsilon = 1e-5);
    }
    for i in 4..=6 {
        assert_abs_diff_eq!(seq.scores[i], 0.2, epsilon = 1e-5);
    }
    assert_abs_diff_eq!(seq.scores[7], 0.3, epsilon = 1e-5);
}

#[test]
fn test_zero_stride_normalized_to_one() {
    let mut source = ScriptedSource::new(vec![0.0, 0.2, 0.4]);
    let seq = build_scores(&mut source, &global(0), &NoOpReporter).unwrap();
    assert_eq!(seq.frame_count(), 3);
    assert_eq!(source.decoded, vec![0, 1, 2]);
}

#[test]
fn test_decode_failure_mid_stream_returns_partial() {
    let mut source = ScriptedSource::new(vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
    source.fail_decode_at = Some(3);
    let seq = build_scores(&mut source, &global(1), &NoOpReporter).unwrap();
    assert_eq!(seq.frame_count(), 3);
}

#[test]
fn test_grab_failure_mid_stream_returns_partial() {
    let mut source = ScriptedSource::new(vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
    source.fail_grab_at = Some(4);
    let seq = build_scores(&mut source, &global(2), &NoOpReporter).unwrap();
    // (0,2) scored; then frame 3 grabbed before the failure -> partial stride (2,3).
    assert_eq!(seq.frame_count(), 4);
    assert_abs_diff_eq!(seq.scores[3], 0.1, epsilon = 1e-5);
}

#[test]
fn test_unreadable_first_frame_is_fatal() {
    let mut empty = ScriptedSource::new(vec![]);
    assert!(matches!(
        build_scores(&mut empty, &global(1), &NoOpReporter),
        Err(MotionError::EmptySource { .. })
    ));

    let mut corrupt = ScriptedSource::new(vec![0.1, 0.2]);
    corrupt.fail_decode_at = Some(0);
    assert!(matches!(
        build_scores(&mut corrupt, &global(1), &NoOpReporter),
        Err(MotionError::EmptySource { .. })
    ));
}

#[test]
fn test_missing_fps_falls_back() {
    let mut source = ScriptedSource::new(vec![0.0, 0.1]);
    source.fps = Some(0.0);
    let seq = build_scores(&mut source, &global(1), &NoOpReporter).unwrap();
    assert_eq!(seq.fps, FALLBACK_FPS);
}

#[test]
fn test_buffered_matches_streaming() {
    let frames = common::still_move_still(64, 32, 5, 7, 6);
    let ser = common::build_ser_with_frames(64, 32, &frames);
    let tmp = common::write_test_ser(&ser);

    for mode in [MotionMode::Global, MotionMode::Detail] {
        for n in [1, 2, 3, 5] {
            let cfg = DetectionConfig {
                motion_mode: mode,
                sample_every_n: n,
                ..Default::default()
            };
            let mut streaming = SerSource::open(tmp.path()).unwrap();
            let expected = build_scores(&mut streaming, &cfg, &NoOpReporter).unwrap();

            let mut buffered = SerSource::open(tmp.path()).unwrap();
            let strides = preprocess_strides(&mut buffered, &cfg).unwrap();
            let scores = build_scores_buffered(&strides, &cfg).unwrap();

            assert_eq!(scores, expected.scores, "mode {mode}, stride {n}");
            assert_eq!(strides.fps, expected.fps);
            assert_eq!(strides.frame_count(), expected.frame_count());
        }
    }
}

/// Run both builders over identically scripted sources.
fn streaming_and_buffered(
    make: impl Fn() -> ScriptedSource,
    cfg: &DetectionConfig,
) -> (Vec<f64>, Vec<f64>, Vec<usize>) {
    let mut streaming = make();
    let expected = build_scores(&mut streaming, cfg, &NoOpReporter).unwrap();

    let mut buffered = make();
    let strides = preprocess_strides(&mut buffered, cfg).unwrap();
    let scores = build_scores_buffered(&strides, cfg).unwrap();
    (expected.scores, scores, buffered.decoded)
}

#[test]
fn test_buffered_never_decodes_skipped_frames() {
    let make = || {
        let mut source = ScriptedSource::new(vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        source.fail_decode_at = Some(2);
        source
    };
    let (streaming, buffered, decoded) = streaming_and_buffered(make, &global(3));

    assert_eq!(streaming.len(), 7);
    assert_eq!(buffered, streaming);
    assert_eq!(decoded, vec![0, 3, 6]);
}

#[test]
fn test_buffered_stops_at_shape_change_like_streaming() {
    let make = || {
        let mut source = ScriptedSource::new(vec![0.0, 0.2, 0.4, 0.6, 0.8]);
        source.widen_from = Some(3);
        source
    };
    for n in [1, 2] {
        let (streaming, buffered, _) = streaming_and_buffered(make, &global(n));
        assert_eq!(buffered, streaming, "stride {n}");
    }

    let (streaming, _, _) = streaming_and_buffered(make, &global(1));
    assert_eq!(streaming.len(), 3);
}

#[test]
fn test_buffered_truncates_on_failures_like_streaming() {
    let grab_fails = || {
        let mut source = ScriptedSource::new(vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
        source.fail_grab_at = Some(4);
        source
    };
    let (streaming, buffered, _) = streaming_and_buffered(grab_fails, &global(2));
    assert_eq!(streaming.len(), 4);
    assert_eq!(buffered, streaming);

    let decode_fails = || {
        let mut source = ScriptedSource::new(vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
        source.fail_decode_at = Some(4);
        source
    };
    let (streaming, buffered, _) = streaming_and_buffered(decode_fails, &global(2));
    assert_eq!(streaming.len(), 3);
    assert_eq!(buffered, streaming);
}

#[test]
fn test_buffered_first_frame_failure_is_fatal() {
    let mut corrupt = ScriptedSource::new(vec![0.1, 0.2]);
    corrupt.fail_decode_at = Some(0);
    assert!(matches!(
        preprocess_strides(&mut corrupt, &global(1)),
        Err(MotionError::EmptySource { .. })
    ));
}

#[test]
fn test_buffered_rejects_empty_input() {
    assert!(matches!(
        build_scores_buffered(
            &StrideFrames {
                frames: vec![],
                advanced: vec![],
                fps: 30.0,
            },
            &DetectionConfig::default()
        ),
        Err(MotionError::EmptySequence)
    ));
}

#[test]
fn test_motion_window_scores_high_only_while_moving() {
    let frames = common::still_move_still(64, 32, 6, 6, 6);
    let tmp = common::write_test_ser(&common::build_ser_with_frames(64, 32, &frames));
    let mut source = SerSource::open(tmp.path()).unwrap();
    let seq = build_scores(&mut source, &DetectionConfig::default(), &NoOpReporter).unwrap();

    assert_eq!(seq.frame_count(), 18);
    assert!(seq.scores[1..6].iter().all(|&s| s == 0.0));
    assert!(seq.scores[6..12].iter().all(|&s| s > 0.05));
    assert!(seq.scores[12..].iter().all(|&s| s == 0.0));
}

#[test]
fn test_image_sequence_source() {
    let dir = tempfile::TempDir::new().unwrap();
    let frames = common::still_move_still(48, 24, 2, 3, 2);
    common::write_png_sequence(dir.path(), 48, 24, &frames);
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let mut source = ImageSequenceSource::open(dir.path()).unwrap();
    assert_eq!(source.files().len(), 7);
    let info = source.info();
    assert_eq!((info.width, info.height), (48, 24));

    let seq = build_scores(&mut source, &DetectionConfig::default(), &NoOpReporter).unwrap();
    assert_eq!(seq.frame_count(), 7);
    assert_eq!(seq.fps, FALLBACK_FPS);
    assert!(seq.scores[3] > 0.0);
}
