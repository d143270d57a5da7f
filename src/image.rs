//! Image geometry and borrowed pixel buffers.
//!
//! - `ImageDesc`: immutable plane geometry plus pixel encoding.
//! - `ImageBuffer` / `ImageBufferMut`: views over caller-owned memory.
//!
//! Nothing in this module owns frame memory. Capture and display keep the
//! bytes; the core only borrows them for the length of one `run` call.

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

/// Pixel encodings understood by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFormat {
    /// Packed YUYV: `Y0 U Y1 V` for every pixel pair.
    Yuv422,
    /// RGB565 with the high byte first.
    Rgb565X,
    Gray8,
    Rgb888,
}

impl VideoFormat {
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            VideoFormat::Gray8 => 1,
            VideoFormat::Yuv422 | VideoFormat::Rgb565X => 2,
            VideoFormat::Rgb888 => 3,
        }
    }
}

// ----------------------------------------------------------------------------
// ImageDesc
// ----------------------------------------------------------------------------

/// Geometry of one image plane. `line_length` is the authoritative stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDesc {
    width: usize,
    height: usize,
    line_length: usize,
    format: VideoFormat,
}

impl ImageDesc {
    pub fn new(
        width: usize,
        height: usize,
        line_length: usize,
        format: VideoFormat,
    ) -> Result<Self, SensorError> {
        if width == 0 || height == 0 {
            return Err(SensorError::UnsupportedGeometry);
        }
        let min_line = width
            .checked_mul(format.bytes_per_pixel())
            .ok_or(SensorError::UnsupportedGeometry)?;
        if line_length < min_line {
            return Err(SensorError::UnsupportedGeometry);
        }
        height
            .checked_mul(line_length)
            .ok_or(SensorError::UnsupportedGeometry)?;
        Ok(Self {
            width,
            height,
            line_length,
            format,
        })
    }

    /// Descriptor with no row padding.
    pub fn packed(width: usize, height: usize, format: VideoFormat) -> Result<Self, SensorError> {
        Self::new(width, height, width * format.bytes_per_pixel(), format)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn line_length(&self) -> usize {
        self.line_length
    }

    #[inline]
    pub fn format(&self) -> VideoFormat {
        self.format
    }

    /// Bytes a buffer must hold to carry one frame of this geometry.
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.height * self.line_length
    }

    /// True when `other` has the same width and height.
    pub fn same_extent(&self, other: &ImageDesc) -> bool {
        self.width == other.width && self.height == other.height
    }
}

// ----------------------------------------------------------------------------
// Buffers
// ----------------------------------------------------------------------------

/// Read-only view of an input frame.
#[derive(Clone, Copy, Debug)]
pub struct ImageBuffer<'a> {
    data: &'a [u8],
}

impl<'a> ImageBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Fails unless the buffer can hold a full frame of `desc`.
    pub fn check(&self, desc: &ImageDesc) -> Result<(), SensorError> {
        check_len(self.data.len(), desc)
    }

    /// Row `y` including stride padding. Caller must have run `check` first.
    #[inline]
    pub fn row(&self, desc: &ImageDesc, y: usize) -> &'a [u8] {
        let start = y * desc.line_length;
        &self.data[start..start + desc.line_length]
    }
}

/// Writable view of an output frame.
#[derive(Debug)]
pub struct ImageBufferMut<'a> {
    data: &'a mut [u8],
}

impl<'a> ImageBufferMut<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn check(&self, desc: &ImageDesc) -> Result<(), SensorError> {
        check_len(self.data.len(), desc)
    }

    #[inline]
    pub fn row_mut(&mut self, desc: &ImageDesc, y: usize) -> &mut [u8] {
        let start = y * desc.line_length;
        &mut self.data[start..start + desc.line_length]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.data
    }
}

fn check_len(got: usize, desc: &ImageDesc) -> Result<(), SensorError> {
    let needed = desc.frame_len();
    if got < needed {
        return Err(SensorError::BufferTooSmall { needed, got });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_stride_and_empty_extent() {
        assert_eq!(
            ImageDesc::new(320, 240, 639, VideoFormat::Yuv422),
            Err(SensorError::UnsupportedGeometry)
        );
        assert!(ImageDesc::new(0, 240, 640, VideoFormat::Yuv422).is_err());
        assert!(ImageDesc::new(320, 0, 640, VideoFormat::Yuv422).is_err());
    }

    #[test]
    fn padded_stride_drives_row_access() {
        let desc = ImageDesc::new(4, 2, 10, VideoFormat::Gray8).unwrap();
        assert_eq!(desc.frame_len(), 20);
        let bytes: Vec<u8> = (0..20).collect();
        let buf = ImageBuffer::new(&bytes);
        buf.check(&desc).unwrap();
        assert_eq!(buf.row(&desc, 1)[0], 10);
        assert_eq!(buf.row(&desc, 1).len(), 10);
    }

    #[test]
    fn short_buffer_reports_sizes() {
        let desc = ImageDesc::packed(8, 8, VideoFormat::Rgb565X).unwrap();
        let mut bytes = vec![0u8; 100];
        let out = ImageBufferMut::new(&mut bytes);
        assert_eq!(
            out.check(&desc),
            Err(SensorError::BufferTooSmall {
                needed: 128,
                got: 100
            })
        );
    }
}
