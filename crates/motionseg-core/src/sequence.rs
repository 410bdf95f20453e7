use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{MotionError, Result};
use crate::frame::{ColorFrame, Frame, SourceInfo};
use crate::io::source::{effective_fps, FrameSource};
use crate::pipeline::config::DetectionConfig;
use crate::pipeline::{DetectionStage, ProgressReporter};
use crate::preprocess::preprocess;
use crate::score::score_pair;

/// One motion score per frame index plus the frame rate of the source.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreSequence {
    pub scores: Vec<f64>,
    pub fps: f64,
}

impl ScoreSequence {
    pub fn frame_count(&self) -> usize {
        self.scores.len()
    }
}

/// Append `grabbed` copies of `raw / grabbed`: the stride's score is spread
/// evenly across every frame it advanced over.
fn push_stride(scores: &mut Vec<f64>, raw: f64, grabbed: usize) {
    let score = raw / grabbed as f64;
    scores.extend(std::iter::repeat(score).take(grabbed));
}

/// One sampling stride: the decoded frame it ended on and how many frames it
/// advanced. `last` is set when the stream ended or failed during the grabs.
struct Stride {
    frame: ColorFrame,
    advanced: usize,
    last: bool,
}

/// Grab up to `n` frames without decoding, then decode the last one grabbed.
///
/// `None` once nothing more can be grabbed or the decode fails. A grab error
/// ends the stream but the frames already grabbed still form a stride.
fn next_stride(source: &mut dyn FrameSource, n: usize, position: usize) -> Option<Stride> {
    let mut advanced = 0usize;
    let mut last = false;
    for _ in 0..n {
        match source.grab() {
            Ok(true) => advanced += 1,
            Ok(false) => {
                last = true;
                break;
            }
            Err(e) => {
                warn!(error = %e, frame = position + advanced, "Grab failed, ending stream early");
                last = true;
                break;
            }
        }
    }
    if advanced == 0 {
        return None;
    }

    match source.retrieve() {
        Ok(frame) => Some(Stride {
            frame,
            advanced,
            last,
        }),
        Err(e) => {
            warn!(error = %e, frame = position + advanced - 1, "Decode failed, ending stream early");
            None
        }
    }
}

fn read_first(source: &mut dyn FrameSource, info: &SourceInfo) -> Result<ColorFrame> {
    match source.read() {
        Ok(Some(frame)) => Ok(frame),
        Ok(None) | Err(_) => Err(MotionError::EmptySource {
            path: info.path.clone(),
        }),
    }
}

/// Score a whole video, one frame pair per sampling stride.
///
/// Frame 0 always scores 0. Each stride skips `sample_every_n - 1` frames
/// without decoding, decodes the next, and compares it with the previously
/// decoded frame. The raw score is divided by the number of frames advanced
/// and replicated across all of them, so the output holds exactly one score
/// per frame read.
///
/// Failing to read the first frame is fatal. Any later grab, decode or
/// scoring failure ends the stream early and the scores so far are returned.
pub fn build_scores(
    source: &mut dyn FrameSource,
    config: &DetectionConfig,
    reporter: &dyn ProgressReporter,
) -> Result<ScoreSequence> {
    let cfg = config.normalized();
    let info = source.info();
    let fps = effective_fps(info.fps);
    debug!(
        mode = %cfg.motion_mode,
        tile_grid = %cfg.tile_grid,
        sample_every_n = cfg.sample_every_n,
        max_width = cfg.max_width,
        fps,
        "Building score sequence"
    );

    let first = read_first(source, &info)?;
    reporter.begin_stage(DetectionStage::Scoring, info.frame_count);
    let mut prev = preprocess(&first, cfg.max_width);
    let mut scores: Vec<f64> = Vec::with_capacity(info.frame_count.unwrap_or(0));
    scores.push(0.0);
    reporter.advance(scores.len());

    let mut done = false;
    while !done {
        let Some(stride) = next_stride(source, cfg.sample_every_n, scores.len()) else {
            break;
        };
        done = stride.last;

        let curr = preprocess(&stride.frame, cfg.max_width);
        let raw = match score_pair(&prev, &curr, cfg.motion_mode, &cfg.tile_grid) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Frame shape changed mid-stream, ending stream early");
                break;
            }
        };

        push_stride(&mut scores, raw, stride.advanced);
        prev = curr;
        reporter.advance(scores.len());
    }

    reporter.finish_stage();
    info!(frames = scores.len(), fps, "Score sequence complete");
    Ok(ScoreSequence { scores, fps })
}

/// Preprocessed frames at the stride endpoints of a source, held in memory.
#[derive(Clone, Debug)]
pub struct StrideFrames {
    /// Frame 0 followed by the frame each stride ended on.
    pub frames: Vec<Frame>,
    /// Frames advanced by each stride; stride `i` leads from `frames[i]` to `frames[i + 1]`.
    pub advanced: Vec<usize>,
    pub fps: f64,
}

impl StrideFrames {
    /// Number of source frames the strides cover.
    pub fn frame_count(&self) -> usize {
        if self.frames.is_empty() {
            0
        } else {
            1 + self.advanced.iter().sum::<usize>()
        }
    }
}

/// Decode and preprocess the stride endpoints of a source into memory.
///
/// Walks the source exactly like [`build_scores`]: skipped frames are only
/// grabbed, an unreadable first frame is fatal, later failures truncate.
pub fn preprocess_strides(source: &mut dyn FrameSource, config: &DetectionConfig) -> Result<StrideFrames> {
    let cfg = config.normalized();
    let info = source.info();
    let fps = effective_fps(info.fps);

    let first = read_first(source, &info)?;
    let mut frames = vec![preprocess(&first, cfg.max_width)];
    let mut advanced = Vec::new();
    let mut position = 1usize;

    let mut done = false;
    while !done {
        let Some(stride) = next_stride(source, cfg.sample_every_n, position) else {
            break;
        };
        done = stride.last;
        frames.push(preprocess(&stride.frame, cfg.max_width));
        advanced.push(stride.advanced);
        position += stride.advanced;
    }

    debug!(decoded = frames.len(), frames = position, "Buffered stride endpoints");
    Ok(StrideFrames {
        frames,
        advanced,
        fps,
    })
}

/// Score stride endpoints already held in memory.
///
/// Produces exactly the sequence [`build_scores`] would for the same source:
/// the pairs are scored in parallel, reassembled in index order, and cut at
/// the first pair that cannot be scored.
pub fn build_scores_buffered(strides: &StrideFrames, config: &DetectionConfig) -> Result<Vec<f64>> {
    if strides.frames.is_empty() {
        return Err(MotionError::EmptySequence);
    }
    let cfg = config.normalized();

    let raw: Vec<Result<f64>> = strides
        .frames
        .par_windows(2)
        .map(|pair| score_pair(&pair[0], &pair[1], cfg.motion_mode, &cfg.tile_grid))
        .collect();

    let mut scores = Vec::with_capacity(strides.frame_count());
    scores.push(0.0);
    for (result, &advanced) in raw.into_iter().zip(&strides.advanced) {
        match result {
            Ok(r) => push_stride(&mut scores, r, advanced),
            Err(e) => {
                warn!(error = %e, "Frame shape changed mid-stream, ending stream early");
                break;
            }
        }
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_frame_count() {
        let frame = Frame::new(ndarray::Array2::zeros((2, 2)));
        let strides = StrideFrames {
            frames: vec![frame.clone(), frame.clone(), frame],
            advanced: vec![3, 1],
            fps: 30.0,
        };
        assert_eq!(strides.frame_count(), 5);
    }

    #[test]
    fn test_push_stride_averages_and_replicates() {
        let mut scores = vec![0.0];
        push_stride(&mut scores, 0.9, 3);
        assert_eq!(scores.len(), 4);
        assert!(scores[1..].iter().all(|&s| (s - 0.3).abs() < 1e-12));
    }
}
