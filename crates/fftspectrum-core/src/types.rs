//! Core types shared across the FFTSpectrum pipeline.
//!
//! This module defines the fundamental data structures used per frame:
//! clip metadata, strided 8-bit image planes, and the dense scratch fields
//! that carry a frame through the transform.

use ndarray::Array2;
use num_complex::Complex32;
use serde::{Deserialize, Serialize};

/// Row alignment (bytes) used when allocating output planes.
pub const PLANE_ALIGNMENT: usize = 32;

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
}

impl Geometry {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of samples in a dense field of this geometry.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Colour family of a clip format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorFamily {
    Gray,
    Yuv,
    Rgb,
    /// Packed legacy layouts that do not expose a separate luma plane.
    Compat,
}

/// Numeric representation of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleType {
    Integer,
    Float,
}

/// Pixel format of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFormat {
    pub color_family: ColorFamily,
    pub sample_type: SampleType,
    pub bits_per_sample: u32,
}

impl VideoFormat {
    /// Single-plane 8-bit integer gray, the output format of the renderer.
    pub const GRAY8: VideoFormat = VideoFormat {
        color_family: ColorFamily::Gray,
        sample_type: SampleType::Integer,
        bits_per_sample: 8,
    };

    /// 8-bit integer samples with a luma plane as plane 0.
    pub fn is_8bit_luma(&self) -> bool {
        self.sample_type == SampleType::Integer
            && self.bits_per_sample == 8
            && matches!(self.color_family, ColorFamily::Gray | ColorFamily::Yuv)
    }
}

/// Clip-level metadata.
///
/// A `format` of `None` or a zero dimension means the clip changes format or
/// size from frame to frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub format: Option<VideoFormat>,
    pub width: usize,
    pub height: usize,
    pub num_frames: usize,
}

impl VideoInfo {
    pub fn is_constant_format(&self) -> bool {
        self.format.is_some() && self.width > 0 && self.height > 0
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.width, self.height)
    }
}

/// An owned single 8-bit image plane with row padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl Plane {
    /// Allocate a zero-filled plane with rows aligned to [`PLANE_ALIGNMENT`].
    pub fn zeroed(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(PLANE_ALIGNMENT) * PLANE_ALIGNMENT;
        Self {
            width,
            height,
            stride,
            data: vec![0; stride * height],
        }
    }

    /// Wrap existing strided data. Returns `None` if `stride < width` or the
    /// buffer is too short for `height` rows.
    pub fn from_raw(width: usize, height: usize, stride: usize, data: Vec<u8>) -> Option<Self> {
        if stride < width || data.len() < stride * height {
            return None;
        }
        Some(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Wrap tightly packed row-major data (`stride == width`).
    pub fn from_packed(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        Self::from_raw(width, height, width, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.width, self.height)
    }

    /// The visible samples of row `y`, without padding.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.stride + x] = value;
    }

    /// Copy the visible samples into a contiguous row-major buffer.
    pub fn to_packed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height);
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }
}

/// Dense row-major complex field of `width * height` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexField {
    pub geometry: Geometry,
    pub data: Vec<Complex32>,
}

impl ComplexField {
    pub fn zeros(geometry: Geometry) -> Self {
        Self {
            geometry,
            data: vec![Complex32::new(0.0, 0.0); geometry.len()],
        }
    }
}

/// Log-magnitude spectrum, shape `(height, width)`.
pub type MagnitudeField = Array2<f32>;
