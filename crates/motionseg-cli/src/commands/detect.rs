use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use motionseg_core::pipeline::config::{DetectionConfig, MotionMode, TileGrid};
use motionseg_core::pipeline::{
    detect_from_scores, detect_from_video, detect_from_video_buffered, DetectionStage,
    ProgressReporter,
};
use motionseg_core::report::{parse_score_list, DetectionReport, ScoreDump};
use tracing::warn;

use crate::summary::print_detection_summary;

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Global,
    Detail,
}

impl From<ModeArg> for MotionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Global => MotionMode::Global,
            ModeArg::Detail => MotionMode::Detail,
        }
    }
}

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["video", "scores", "scores_file"])))]
pub struct DetectArgs {
    /// Video file, SER file, or directory of images
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Comma-separated per-frame scores, e.g. "0,0.1,0.3"
    #[arg(long)]
    pub scores: Option<String>,

    /// Score dump written earlier with --scores-out
    #[arg(long)]
    pub scores_file: Option<PathBuf>,

    /// Detection config file (TOML); flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Motion threshold; frames scoring at or above it are in motion
    #[arg(long)]
    pub sensitivity: Option<f64>,

    /// Drop segments shorter than this many frames
    #[arg(long)]
    pub min_segment_frames: Option<usize>,

    /// Join segments separated by at most this many still frames
    #[arg(long)]
    pub merge_gap_frames: Option<usize>,

    /// Decode and score only every Nth frame
    #[arg(long)]
    pub sample_every_n: Option<usize>,

    /// Tile grid for detail mode, e.g. "8x8" (rows x columns)
    #[arg(long)]
    pub tile_grid: Option<TileGrid>,

    /// Score function
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Downscale frames wider than this before scoring
    #[arg(long)]
    pub max_width: Option<usize>,

    /// Decode the whole video first and score frame pairs in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output segments file (JSON)
    #[arg(short, long, default_value = "segments.json")]
    pub out: PathBuf,

    /// Also save the per-frame scores (JSON)
    #[arg(long)]
    pub scores_out: Option<PathBuf>,
}

/// Drives a single progress bar across the detection stages.
struct BarReporter {
    pb: ProgressBar,
    counted: ProgressStyle,
    open_ended: ProgressStyle,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let counted = ProgressStyle::default_bar()
            .template("{msg:18} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> ");
        let open_ended = ProgressStyle::default_spinner().template("{msg:18} {spinner} {pos}")?;
        Ok(Self {
            pb: ProgressBar::new(0),
            counted,
            open_ended,
        })
    }

    fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: DetectionStage, total_items: Option<usize>) {
        match total_items {
            Some(n) => {
                self.pb.set_style(self.counted.clone());
                self.pb.set_length(n as u64);
            }
            None => self.pb.set_style(self.open_ended.clone()),
        }
        self.pb.set_message(stage.to_string());
        self.pb.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.pb.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.pb.length() {
            self.pb.set_position(len);
        }
    }
}

pub fn run(args: &DetectArgs) -> Result<()> {
    let config = build_config(args)?;
    let reporter = BarReporter::new()?;

    let (report, sequence) = if let Some(ref video) = args.video {
        let run = if args.parallel {
            detect_from_video_buffered(video, &config, &reporter)
        } else {
            detect_from_video(video, &config, &reporter)
        };
        let (report, sequence) = match run {
            Ok(done) => done,
            Err(e) => {
                reporter.finish();
                return Err(e).with_context(|| format!("Detection failed on {}", video.display()));
            }
        };
        let dump = ScoreDump {
            fps: sequence.fps,
            scores: sequence.scores,
        };
        (report, Some(dump))
    } else if let Some(ref list) = args.scores {
        let scores = parse_score_list(list)?;
        (detect_from_scores(&scores, &config), None)
    } else if let Some(ref path) = args.scores_file {
        let dump = ScoreDump::load(path)
            .with_context(|| format!("Failed to read scores from {}", path.display()))?;
        let mut report = detect_from_scores(&dump.scores, &config);
        report.fps = dump.fps;
        (report, None)
    } else {
        bail!("one of --video, --scores or --scores-file is required");
    };

    reporter.begin_stage(DetectionStage::Writing, None);
    let written = write_outputs(args, &report, sequence.as_ref());
    reporter.finish();
    written?;

    print_detection_summary(&config, &report);
    println!("Segments saved to {}", args.out.display());
    Ok(())
}

fn write_outputs(args: &DetectArgs, report: &DetectionReport, scores: Option<&ScoreDump>) -> Result<()> {
    report
        .save(&args.out)
        .with_context(|| format!("Failed to write segments to {}", args.out.display()))?;

    if let Some(ref path) = args.scores_out {
        match scores {
            Some(dump) => dump
                .save(path)
                .with_context(|| format!("Failed to write scores to {}", path.display()))?,
            None => warn!("--scores-out only applies to --video input; nothing written"),
        }
    }
    Ok(())
}

/// Defaults, then the config file, then individual flags.
fn build_config(args: &DetectArgs) -> Result<DetectionConfig> {
    let mut config = match args.config {
        Some(ref path) => load_config(path)?,
        None => DetectionConfig::default(),
    };

    if let Some(v) = args.sensitivity {
        config.sensitivity = v;
    }
    if let Some(v) = args.min_segment_frames {
        config.min_segment_frames = v;
    }
    if let Some(v) = args.merge_gap_frames {
        config.merge_gap_frames = v;
    }
    if let Some(v) = args.sample_every_n {
        config.sample_every_n = v;
    }
    if let Some(v) = args.tile_grid {
        config.tile_grid = v;
    }
    if let Some(v) = args.mode {
        config.motion_mode = v.into();
    }
    if let Some(v) = args.max_width {
        config.max_width = v;
    }

    Ok(config.normalized())
}

fn load_config(path: &Path) -> Result<DetectionConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).context("Invalid detection config")
}
