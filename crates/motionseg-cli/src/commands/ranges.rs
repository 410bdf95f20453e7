use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use motionseg_core::range::{fit_segments, ranges_from_segments, FrameRange, SpanPolicy};
use motionseg_core::report::DetectionReport;

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Drop ranges that leave the clip
    Reject,
    /// Trim ranges to the clip
    Clamp,
}

impl From<PolicyArg> for SpanPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Reject => SpanPolicy::Reject,
            PolicyArg::Clamp => SpanPolicy::Clamp,
        }
    }
}

#[derive(Args)]
pub struct RangesArgs {
    /// Segments file written by `detect`
    pub segments: PathBuf,

    /// Frame of the target where video frame 0 sits
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub offset: i64,

    /// Length of the target clip; ranges outside it are handled by --policy
    #[arg(long)]
    pub clip_duration: Option<i64>,

    /// What to do with ranges leaving the clip
    #[arg(long, value_enum, default_value = "reject")]
    pub policy: PolicyArg,
}

pub fn run(args: &RangesArgs) -> Result<()> {
    let report = DetectionReport::load(&args.segments)
        .with_context(|| format!("Failed to read segments from {}", args.segments.display()))?;

    let ranges = match args.clip_duration {
        Some(duration) => {
            let span = FrameRange::from_duration(args.offset, duration);
            fit_segments(&report.segments, args.offset, &span, args.policy.into())
        }
        None => ranges_from_segments(&report.segments, args.offset),
    };

    if ranges.is_empty() {
        println!("No ranges.");
        return Ok(());
    }
    for range in &ranges {
        println!("{}\t{} frames", range, range.length());
    }
    let dropped = report.segments.len() - ranges.len();
    if dropped > 0 {
        println!("{dropped} segment(s) fell outside the clip");
    }
    Ok(())
}
