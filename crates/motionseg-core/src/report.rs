use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::pipeline::config::DetectionConfig;
use crate::segment::Segment;

/// The segmentation parameters recorded alongside a result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionSettings {
    pub sensitivity: f64,
    pub min_segment_frames: usize,
    pub merge_gap_frames: usize,
}

impl From<&DetectionConfig> for DetectionSettings {
    fn from(cfg: &DetectionConfig) -> Self {
        Self {
            sensitivity: cfg.sensitivity,
            min_segment_frames: cfg.min_segment_frames,
            merge_gap_frames: cfg.merge_gap_frames,
        }
    }
}

/// Persisted outcome of a detection run, reusable without re-decoding video.
///
/// `fps` is 0.0 when the scores were supplied directly rather than measured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub settings: DetectionSettings,
    #[serde(default)]
    pub fps: f64,
    #[serde(default)]
    pub frame_count: usize,
    pub segments: Vec<Segment>,
}

impl DetectionReport {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(self, path)
    }
}

/// Raw per-frame scores with the source frame rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreDump {
    pub fps: f64,
    pub scores: Vec<f64>,
}

impl ScoreDump {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(self, path)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Parse `"0.0, 0.1,0.3"` into scores. Empty items are skipped; NaN and
/// infinities are rejected.
pub fn parse_score_list(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.parse::<f64>() {
            Ok(score) if score.is_finite() => Ok(score),
            Ok(_) => Err(MotionError::InvalidScores(format!("'{item}' is not finite"))),
            Err(_) => Err(MotionError::InvalidScores(format!("'{item}' is not a number"))),
        })
        .collect()
}
