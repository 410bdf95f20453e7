use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::consts::SER_TICKS_PER_SECOND;
use crate::error::{MotionError, Result};
use crate::frame::{ColorFrame, SourceInfo, SourceKind};

use super::source::FrameSource;

pub const SER_HEADER_SIZE: usize = 178;
const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
}

impl SerHeader {
    /// Bytes per pixel plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_pixel_plane(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    /// Number of planes per pixel (1 for mono/bayer, 3 for RGB/BGR).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            100 | 101 => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame, `None` on overflow.
    pub fn frame_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_pixel_plane() * self.planes_per_pixel())
    }
}

/// Memory-mapped SER file reader.
pub struct SerReader {
    mmap: Mmap,
    frame_bytes: usize,
    pub header: SerHeader,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(MotionError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }

        if &mmap[0..14] != SER_MAGIC {
            return Err(MotionError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;
        let frame_bytes = header
            .frame_byte_size()
            .ok_or_else(|| MotionError::InvalidSer("Frame size overflow".into()))?;

        let expected_data_size = frame_bytes
            .checked_mul(header.frame_count as usize)
            .and_then(|n| n.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| MotionError::InvalidSer("Data size overflow".into()))?;
        if mmap.len() < expected_data_size {
            return Err(MotionError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected_data_size,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            frame_bytes,
            header,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Get the raw bytes for a single frame (zero-copy from mmap).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let count = self.frame_count();
        if index >= count {
            return Err(MotionError::FrameIndexOutOfRange {
                index,
                total: count,
            });
        }
        let offset = SER_HEADER_SIZE + index * self.frame_bytes;
        Ok(&self.mmap[offset..offset + self.frame_bytes])
    }

    /// Read a single frame as a color frame in [0.0, 1.0].
    ///
    /// Mono and Bayer data is returned as a gray plane replicated across channels.
    pub fn read_frame(&self, index: usize) -> Result<ColorFrame> {
        let raw = self.frame_raw(index)?;
        let h = self.header.height as usize;
        let w = self.header.width as usize;

        let decode = |plane: usize| {
            decode_plane(
                raw,
                h,
                w,
                self.header.bytes_per_pixel_plane(),
                self.header.planes_per_pixel(),
                plane,
                self.header.pixel_depth,
                self.header.little_endian,
            )
        };

        Ok(match self.header.color_id {
            100 => ColorFrame {
                red: decode(0),
                green: decode(1),
                blue: decode(2),
            },
            101 => ColorFrame {
                red: decode(2),
                green: decode(1),
                blue: decode(0),
            },
            _ => ColorFrame::from_gray(decode(0)),
        })
    }

    /// Per-frame timestamp from the optional trailer, in 100 ns ticks.
    pub fn timestamp(&self, index: usize) -> Option<u64> {
        let trailer_offset = SER_HEADER_SIZE + self.frame_bytes * self.frame_count();
        let ts_offset = trailer_offset + index * 8;
        if ts_offset + 8 <= self.mmap.len() {
            let bytes = &self.mmap[ts_offset..ts_offset + 8];
            Some(u64::from_le_bytes(bytes.try_into().ok()?))
        } else {
            None
        }
    }

    /// Frame rate implied by the first and last trailer timestamps.
    pub fn estimated_fps(&self) -> Option<f64> {
        let n = self.frame_count();
        if n < 2 {
            return None;
        }
        let first = self.timestamp(0)?;
        let last = self.timestamp(n - 1)?;
        if last <= first {
            return None;
        }
        let seconds = (last - first) as f64 / SER_TICKS_PER_SECOND;
        Some((n - 1) as f64 / seconds)
    }
}

/// [`FrameSource`] over a SER file.
pub struct SerSource {
    path: PathBuf,
    reader: SerReader,
    next: usize,
    grabbed: Option<usize>,
}

impl SerSource {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = SerReader::open(path).map_err(|e| MotionError::SourceOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            next: 0,
            grabbed: None,
        })
    }

    pub fn reader(&self) -> &SerReader {
        &self.reader
    }
}

impl FrameSource for SerSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            path: self.path.clone(),
            kind: SourceKind::Ser,
            width: self.reader.header.width,
            height: self.reader.header.height,
            frame_count: Some(self.reader.frame_count()),
            fps: self.reader.estimated_fps(),
        }
    }

    fn grab(&mut self) -> Result<bool> {
        if self.next >= self.reader.frame_count() {
            return Ok(false);
        }
        self.grabbed = Some(self.next);
        self.next += 1;
        Ok(true)
    }

    fn retrieve(&mut self) -> Result<ColorFrame> {
        let index = self.grabbed.ok_or(MotionError::NothingGrabbed)?;
        self.reader.read_frame(index)
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    if width == 0 || height == 0 {
        return Err(MotionError::InvalidDimensions { width, height });
    }
    if pixel_depth == 0 || pixel_depth > 16 {
        return Err(MotionError::InvalidSer(format!(
            "Unsupported pixel depth {pixel_depth}"
        )));
    }

    // Treat 0 as little-endian, matching what most capture tools actually write.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
    })
}

#[allow(clippy::too_many_arguments)]
fn decode_plane(
    raw: &[u8],
    height: usize,
    width: usize,
    bytes_per_sample: usize,
    planes: usize,
    plane_index: usize,
    bit_depth: u32,
    little_endian: bool,
) -> Array2<f32> {
    let max_val = ((1u32 << bit_depth) - 1) as f32;
    let mut data = Array2::<f32>::zeros((height, width));

    for row in 0..height {
        for col in 0..width {
            let pixel_offset = (row * width + col) * planes * bytes_per_sample;
            let idx = pixel_offset + plane_index * bytes_per_sample;
            let val = if bytes_per_sample == 1 {
                raw[idx] as f32
            } else {
                let pair = [raw[idx], raw[idx + 1]];
                if little_endian {
                    u16::from_le_bytes(pair) as f32
                } else {
                    u16::from_be_bytes(pair) as f32
                }
            };
            data[[row, col]] = val / max_val;
        }
    }

    data
}
