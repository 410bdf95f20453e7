use std::path::Path;

use motionseg_core::io::ser::SER_HEADER_SIZE;

/// Build a SER file header for mono 8-bit frames.
///
/// Returns a `Vec<u8>` containing just the 178-byte header.
/// Append frame pixel data after calling this function.
pub fn build_ser_header(width: u32, height: u32, num_frames: usize) -> Vec<u8> {
    build_ser_header_full(width, height, 8, num_frames, 0)
}

/// Build a SER file header with configurable bit depth and color mode.
///
/// `color_id`: 0=MONO, 8=BAYER_RGGB, 100=RGB, 101=BGR
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID (4 bytes)
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0
    buf.extend_from_slice(&0i32.to_le_bytes());
    // Width
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    // Height
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    // PixelDepth
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    // FrameCount
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope (40 bytes each)
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC (8 bytes each)
    buf.extend_from_slice(&[0u8; 16]);

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Build a complete synthetic mono 8-bit SER file with the given frame data.
pub fn build_ser_with_frames(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header(width, height, frames.len());
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Append a timestamp trailer spacing frames `1 / fps` seconds apart.
pub fn append_timestamps(buf: &mut Vec<u8>, num_frames: usize, fps: f64) {
    let start: u64 = 638_000_000_000_000_000;
    let step = (10_000_000.0 / fps).round() as u64;
    for i in 0..num_frames as u64 {
        buf.extend_from_slice(&(start + i * step).to_le_bytes());
    }
}

/// Write a SER buffer to a temporary file and return the temp file handle.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_test_ser(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::Builder::new()
        .suffix(".ser")
        .tempfile()
        .expect("create temp file");
    f.write_all(data).expect("write SER data");
    f.flush().expect("flush");
    f
}

/// A dark frame with a bright `size` x `size` square whose top-left corner is at `(y, x)`.
pub fn square_frame(width: usize, height: usize, y: usize, x: usize, size: usize) -> Vec<u8> {
    let mut frame = vec![16u8; width * height];
    for row in y..(y + size).min(height) {
        for col in x..(x + size).min(width) {
            frame[row * width + col] = 240;
        }
    }
    frame
}

/// Frames where the square holds still, then moves for `moving` frames, then stops.
///
/// Layout: `still_before` static frames, `moving` frames each shifted 3 px
/// right, then `still_after` frames at the final position.
pub fn still_move_still(
    width: usize,
    height: usize,
    still_before: usize,
    moving: usize,
    still_after: usize,
) -> Vec<Vec<u8>> {
    let size = 8;
    let y = height / 2 - size / 2;
    let mut x = 2;
    let mut frames = Vec::new();
    for _ in 0..still_before {
        frames.push(square_frame(width, height, y, x, size));
    }
    for _ in 0..moving {
        x += 3;
        frames.push(square_frame(width, height, y, x, size));
    }
    for _ in 0..still_after {
        frames.push(square_frame(width, height, y, x, size));
    }
    frames
}

/// Write mono 8-bit frames as a numbered PNG sequence into `dir`.
pub fn write_png_sequence(dir: &Path, width: u32, height: u32, frames: &[Vec<u8>]) {
    for (i, frame) in frames.iter().enumerate() {
        let img = image::GrayImage::from_raw(width, height, frame.clone()).expect("frame size");
        img.save(dir.join(format!("frame_{i:04}.png"))).expect("save png");
    }
}
