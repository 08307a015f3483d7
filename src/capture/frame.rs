//! Camera frames and conversion to the display layout
//!
//! Cameras hand out interleaved BGR pixels, optionally padded to four bytes
//! and optionally stored bottom-up. The widget shows a selfie view, so every
//! frame is mirrored horizontally while it is converted into an opaque RGBA
//! `tiny_skia::Pixmap`.

use thiserror::Error;
use tiny_skia::Pixmap;

/// Interleaved pixel layouts a camera may deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// Blue, green, red; 3 bytes per pixel
    Bgr24,
    /// Blue, green, red, padding; 4 bytes per pixel
    Bgrx32,
}

impl PixelLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Bgr24 => 3,
            PixelLayout::Bgrx32 => 4,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Row stride {stride} is shorter than a {width} pixel row")]
    StrideTooShort { stride: usize, width: u32 },

    #[error("Frame buffer holds {actual} bytes, expected at least {expected}")]
    BufferTooSmall { expected: usize, actual: usize },
}

/// One raw frame as delivered by a camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    /// Bytes between the starts of consecutive rows in `data`
    stride: usize,
    /// Rows are stored bottom row first
    bottom_up: bool,
    data: Vec<u8>,
}

impl Frame {
    /// Creates a tightly packed, top-down frame
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        let stride = width as usize * layout.bytes_per_pixel();
        Self::with_stride(width, height, layout, stride, false, data)
    }

    /// Creates a frame with explicit row stride and row order
    pub fn with_stride(
        width: u32,
        height: u32,
        layout: PixelLayout,
        stride: usize,
        bottom_up: bool,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::InvalidDimensions { width, height });
        }

        let row_bytes = width as usize * layout.bytes_per_pixel();
        if stride < row_bytes {
            return Err(FrameError::StrideTooShort { stride, width });
        }

        // The last row does not need trailing padding
        let expected = stride * (height as usize - 1) + row_bytes;
        if data.len() < expected {
            return Err(FrameError::BufferTooSmall {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            layout,
            stride,
            bottom_up,
            data,
        })
    }

    /// Mirrors the frame horizontally and converts it to opaque RGBA
    pub fn to_display_image(&self) -> Result<Pixmap, FrameError> {
        let mut pixmap = Pixmap::new(self.width, self.height).ok_or(FrameError::InvalidDimensions {
            width: self.width,
            height: self.height,
        })?;

        let bpp = self.layout.bytes_per_pixel();
        let width = self.width as usize;
        let height = self.height as usize;
        let out = pixmap.data_mut();

        for row in 0..height {
            let source_row = if self.bottom_up { height - 1 - row } else { row };
            let src = &self.data[source_row * self.stride..source_row * self.stride + width * bpp];
            let dst = &mut out[row * width * 4..(row + 1) * width * 4];

            for (dst_px, src_px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(bpp).rev()) {
                dst_px[0] = src_px[2];
                dst_px[1] = src_px[1];
                dst_px[2] = src_px[0];
                dst_px[3] = 255;
            }
        }

        Ok(pixmap)
    }
}
