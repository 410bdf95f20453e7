/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Frames wider than this are downscaled before scoring.
pub const DEFAULT_MAX_WIDTH: usize = 640;

/// Side length of the square noise-suppression blur applied to frame differences.
pub const DIFF_BLUR_KSIZE: usize = 5;

/// Blur sigma derived from the kernel size the same way OpenCV does for sigma = 0:
/// `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
pub const DIFF_BLUR_SIGMA: f32 = 0.3 * ((DIFF_BLUR_KSIZE as f32 - 1.0) * 0.5 - 1.0) + 0.8;

/// Fraction of tiles averaged by the detail score.
pub const DETAIL_TOP_FRACTION: f64 = 0.15;

/// Frame rate assumed when a source reports none, zero or garbage.
pub const FALLBACK_FPS: f64 = 30.0;

/// Default motion threshold for a frame to count as "in motion".
pub const DEFAULT_SENSITIVITY: f64 = 0.03;

/// Default minimum length of an output segment, in frames.
pub const DEFAULT_MIN_SEGMENT_FRAMES: usize = 6;

/// Default maximum number of still frames bridged between two segments.
pub const DEFAULT_MERGE_GAP_FRAMES: usize = 3;

/// Default tile grid rows and columns for the detail score.
pub const DEFAULT_TILE_GRID: usize = 8;

/// Name prefix identifying markers written by this tool.
pub const MARKER_PREFIX: &str = "[DSU]";

/// SER timestamps count 100 ns ticks.
pub const SER_TICKS_PER_SECOND: f64 = 10_000_000.0;
