use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::io::source::{open_source, FrameSource};
use crate::report::{DetectionReport, DetectionSettings};
use crate::segment::detect_segments;
use crate::sequence::{build_scores, build_scores_buffered, preprocess_strides, ScoreSequence};

use super::config::DetectionConfig;
use super::types::{DetectionStage, NoOpReporter, ProgressReporter};

/// `config` must already be normalized.
fn segment_report(
    scores: &[f64],
    fps: f64,
    config: &DetectionConfig,
    reporter: &dyn ProgressReporter,
) -> DetectionReport {
    reporter.begin_stage(DetectionStage::Segmenting, Some(scores.len()));
    let segments = detect_segments(scores, config);
    reporter.finish_stage();

    info!(
        frames = scores.len(),
        segments = segments.len(),
        "Detection complete"
    );
    DetectionReport {
        settings: DetectionSettings::from(config),
        fps,
        frame_count: scores.len(),
        segments,
    }
}

/// Segment a score sequence supplied directly. The report's fps is 0.0.
pub fn detect_from_scores(scores: &[f64], config: &DetectionConfig) -> DetectionReport {
    segment_report(scores, 0.0, &config.normalized(), &NoOpReporter)
}

/// Score and segment an already opened source.
pub fn detect_from_source(
    source: &mut dyn FrameSource,
    config: &DetectionConfig,
    reporter: &dyn ProgressReporter,
) -> Result<(DetectionReport, ScoreSequence)> {
    let config = config.normalized();
    let sequence = build_scores(source, &config, reporter)?;
    let report = segment_report(&sequence.scores, sequence.fps, &config, reporter);
    Ok((report, sequence))
}

/// Open the video at `path`, score it, and segment the scores.
///
/// The source is closed before returning, on success and on error alike.
pub fn detect_from_video(
    path: &Path,
    config: &DetectionConfig,
    reporter: &dyn ProgressReporter,
) -> Result<(DetectionReport, ScoreSequence)> {
    reporter.begin_stage(DetectionStage::Opening, None);
    let mut source = open_source(path)?;
    reporter.finish_stage();
    info!(path = %path.display(), kind = %source.info().kind, "Opened video source");
    detect_from_source(source.as_mut(), config, reporter)
}

/// Like [`detect_from_video`], but decodes every stride endpoint up front and
/// scores the frame pairs in parallel. Same result, more memory.
pub fn detect_from_video_buffered(
    path: &Path,
    config: &DetectionConfig,
    reporter: &dyn ProgressReporter,
) -> Result<(DetectionReport, ScoreSequence)> {
    let config = config.normalized();
    reporter.begin_stage(DetectionStage::Opening, None);
    let mut source = open_source(path)?;
    let strides = preprocess_strides(source.as_mut(), &config)?;
    drop(source);
    reporter.finish_stage();

    reporter.begin_stage(DetectionStage::Scoring, Some(strides.frame_count()));
    let scores = build_scores_buffered(&strides, &config)?;
    reporter.advance(scores.len());
    reporter.finish_stage();

    let fps = strides.fps;
    let report = segment_report(&scores, fps, &config, reporter);
    Ok((report, ScoreSequence { scores, fps }))
}
