use std::ffi::OsString;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use serde::Deserialize;
use tracing::debug;

use crate::error::{MotionError, Result};
use crate::frame::{ColorFrame, SourceInfo, SourceKind};

use super::source::FrameSource;

const FFMPEG_BIN: &str = "ffmpeg";
const FFPROBE_BIN: &str = "ffprobe";

#[derive(Deserialize)]
struct ProbeOutput {
    streams: Option<Vec<ProbeStream>>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    tags: Option<ProbeTags>,
    side_data_list: Option<Vec<ProbeSideData>>,
}

#[derive(Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

/// Video stream properties reported by ffprobe.
///
/// `width` and `height` are the coded size, which is also the size frames are
/// decoded at since display rotation is never applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeInfo {
    pub width: u32,
    pub height: u32,
    pub fps: Option<f64>,
    pub frame_count: Option<usize>,
    /// Display rotation in degrees, normalized to `0..360`.
    pub rotation: u32,
}

/// Parse a frame rate such as `"30/1"`, `"30000/1001"` or `"29.97"`.
/// `"0/0"` and other degenerate values yield `None`.
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let fps = if let Some((num, den)) = rate.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        num / den
    } else {
        rate.trim().parse().ok()?
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Extract the first video stream from ffprobe's JSON output.
pub fn parse_probe_json(json: &str) -> Result<ProbeInfo> {
    let probe: ProbeOutput = serde_json::from_str(json)?;
    let stream = probe
        .streams
        .and_then(|s| s.into_iter().next())
        .ok_or_else(|| MotionError::Ffmpeg("no video stream".into()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        (w, h) => {
            return Err(MotionError::InvalidDimensions {
                width: w.unwrap_or(0),
                height: h.unwrap_or(0),
            })
        }
    };

    let fps = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.avg_frame_rate.as_deref().and_then(parse_frame_rate));
    let frame_count = stream.nb_frames.as_deref().and_then(|n| n.parse().ok());

    let side_rotation = stream
        .side_data_list
        .iter()
        .flatten()
        .find_map(|side| side.rotation);
    let tag_rotation = stream
        .tags
        .and_then(|t| t.rotate)
        .and_then(|r| r.trim().parse::<f64>().ok());
    let rotation = side_rotation
        .or(tag_rotation)
        .filter(|r| r.is_finite())
        .map_or(0, |r| (r.round() as i64).rem_euclid(360) as u32);

    Ok(ProbeInfo {
        width,
        height,
        fps,
        frame_count,
        rotation,
    })
}

fn probe(path: &Path) -> Result<ProbeInfo> {
    let output = Command::new(FFPROBE_BIN)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,avg_frame_rate,nb_frames:stream_tags=rotate:stream_side_data=rotation",
            "-of",
            "json",
        ])
        .arg(path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MotionError::Ffmpeg(format!("ffprobe failed: {}", stderr.trim())));
    }
    parse_probe_json(&String::from_utf8_lossy(&output.stdout))
}

/// Arguments streaming `path` as raw `rgb24` on stdout. Autorotation is off
/// so frames arrive at the probed coded size.
fn decode_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-v", "error", "-nostdin", "-noautorotate", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(path.as_os_str().to_owned());
    args.extend(
        ["-an", "-sn", "-dn", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"]
            .into_iter()
            .map(OsString::from),
    );
    args
}

/// Any container ffmpeg can decode, streamed as raw `rgb24` frames over a pipe.
pub struct FfmpegSource {
    path: PathBuf,
    probe: ProbeInfo,
    child: Child,
    stdout: ChildStdout,
    buffer: Vec<u8>,
    has_frame: bool,
}

impl FfmpegSource {
    pub fn open(path: &Path) -> Result<Self> {
        let open_err = |reason: String| MotionError::SourceOpen {
            path: path.to_path_buf(),
            reason,
        };

        let probe = probe(path).map_err(|e| open_err(e.to_string()))?;
        debug!(?probe, path = %path.display(), "Probed video stream");

        let mut child = Command::new(FFMPEG_BIN)
            .args(decode_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| open_err(format!("failed to start ffmpeg: {e}")))?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(open_err("ffmpeg stdout unavailable".into()));
            }
        };

        let frame_bytes = probe.width as usize * probe.height as usize * 3;
        Ok(Self {
            path: path.to_path_buf(),
            probe,
            child,
            stdout,
            buffer: vec![0u8; frame_bytes],
            has_frame: false,
        })
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            path: self.path.clone(),
            kind: SourceKind::Ffmpeg,
            width: self.probe.width,
            height: self.probe.height,
            frame_count: self.probe.frame_count,
            fps: self.probe.fps,
        }
    }

    fn grab(&mut self) -> Result<bool> {
        match self.stdout.read_exact(&mut self.buffer) {
            Ok(()) => {
                self.has_frame = true;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.has_frame = false;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn retrieve(&mut self) -> Result<ColorFrame> {
        if !self.has_frame {
            return Err(MotionError::NothingGrabbed);
        }
        Ok(ColorFrame::from_rgb8(
            &self.buffer,
            self.probe.height as usize,
            self.probe.width as usize,
        ))
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
