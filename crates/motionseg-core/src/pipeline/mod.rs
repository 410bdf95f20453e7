pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{
    detect_from_scores, detect_from_source, detect_from_video, detect_from_video_buffered,
};
pub use types::{DetectionStage, NoOpReporter, ProgressReporter};
