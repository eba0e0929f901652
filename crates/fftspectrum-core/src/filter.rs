//! The spectrum filter: construction-time validation and the per-frame
//! pipeline.
//!
//! A frame flows convert → forward DFT → log-magnitude → render → grid. The
//! only state shared between frames is the backend's cached plan, which is
//! read-only while executing. Scratch fields are owned by the caller through
//! [`SpectrumScratch`], so concurrent requests never share working memory.

use std::sync::Arc;
use std::time::Instant;

use fftspectrum_compute::{ComputeError, SpectrumBackend};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convert::fill_complex_field;
use crate::grid::draw_grid;
use crate::magnitude::compute_log_magnitude;
use crate::render::render_spectrum;
use crate::types::{ComplexField, Geometry, MagnitudeField, Plane, VideoFormat, VideoInfo};

/// Errors raised while building or running the filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("FFTSpectrum: only constant-format 8-bit integer luma-containing input supported")]
    UnsupportedFormat,

    #[error("Frame is {}x{} but the clip is {}x{}", actual.width, actual.height, expected.width, expected.height)]
    GeometryMismatch { expected: Geometry, actual: Geometry },

    #[error("Frame {index} requested from a clip of {num_frames} frames")]
    FrameOutOfRange { index: usize, num_frames: usize },

    #[error("Frame source error: {0}")]
    Source(String),

    #[error("Compute backend error: {0}")]
    Compute(#[from] ComputeError),
}

/// User-facing options of the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FftSpectrumOptions {
    /// Burn a reference grid over the spectrum.
    pub grid: bool,
}

impl FftSpectrumOptions {
    /// Interpret an optional integer argument: absent or 0 is off.
    pub fn from_int(grid: Option<i64>) -> Self {
        Self {
            grid: grid.is_some_and(|v| v != 0),
        }
    }
}

/// Per-worker working buffers for one frame geometry.
///
/// Reused across frames of the same size and reallocated when the size
/// changes.
#[derive(Debug, Clone)]
pub struct SpectrumScratch {
    input: ComplexField,
    spectrum: ComplexField,
    magnitude: MagnitudeField,
}

impl SpectrumScratch {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            input: ComplexField::zeros(geometry),
            spectrum: ComplexField::zeros(geometry),
            magnitude: MagnitudeField::zeros((geometry.height, geometry.width)),
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.input.geometry
    }

    /// The log-magnitude field of the most recently processed frame.
    pub fn magnitude(&self) -> &MagnitudeField {
        &self.magnitude
    }

    fn fit(&mut self, geometry: Geometry) {
        if self.geometry() != geometry {
            *self = Self::new(geometry);
        }
    }
}

/// A constructed spectrum filter bound to one clip.
pub struct FftSpectrum {
    backend: Arc<dyn SpectrumBackend>,
    input_info: VideoInfo,
    output_info: VideoInfo,
    show_grid: bool,
}

impl std::fmt::Debug for FftSpectrum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftSpectrum")
            .field("backend", &self.backend.device_info().name)
            .field("input_info", &self.input_info)
            .field("show_grid", &self.show_grid)
            .finish()
    }
}

impl FftSpectrum {
    /// Validate the clip and plan the transform for its geometry.
    ///
    /// Fails before touching the backend if the clip is not constant-format
    /// 8-bit integer with a luma plane.
    pub fn new(
        info: &VideoInfo,
        options: FftSpectrumOptions,
        backend: Arc<dyn SpectrumBackend>,
    ) -> Result<Self, FilterError> {
        let supported = info.is_constant_format()
            && info.format.as_ref().is_some_and(VideoFormat::is_8bit_luma);
        if !supported {
            warn!("rejecting clip with format {:?}", info.format);
            return Err(FilterError::UnsupportedFormat);
        }

        backend.prepare(info.width, info.height)?;

        let output_info = VideoInfo {
            format: Some(VideoFormat::GRAY8),
            ..info.clone()
        };
        Ok(Self {
            backend,
            input_info: info.clone(),
            output_info,
            show_grid: options.grid,
        })
    }

    pub fn input_info(&self) -> &VideoInfo {
        &self.input_info
    }

    /// Same size and length as the input, single-plane 8-bit gray.
    pub fn output_info(&self) -> &VideoInfo {
        &self.output_info
    }

    pub fn geometry(&self) -> Geometry {
        self.input_info.geometry()
    }

    pub fn shows_grid(&self) -> bool {
        self.show_grid
    }

    /// Render one frame with freshly allocated scratch buffers.
    pub fn process_frame(&self, frame: &Plane) -> Result<Plane, FilterError> {
        let mut scratch = SpectrumScratch::new(self.geometry());
        self.process_frame_with(frame, &mut scratch)
    }

    /// Render one frame using caller-owned scratch buffers.
    pub fn process_frame_with(
        &self,
        frame: &Plane,
        scratch: &mut SpectrumScratch,
    ) -> Result<Plane, FilterError> {
        let geometry = self.geometry();
        if frame.geometry() != geometry {
            return Err(FilterError::GeometryMismatch {
                expected: geometry,
                actual: frame.geometry(),
            });
        }
        let started = Instant::now();
        scratch.fit(geometry);

        fill_complex_field(frame, &mut scratch.input);
        self.backend.forward_2d(
            &mut scratch.input.data,
            &mut scratch.spectrum.data,
            geometry.width,
            geometry.height,
        )?;
        compute_log_magnitude(&scratch.spectrum.data, &mut scratch.magnitude);

        let mut out = Plane::zeroed(geometry.width, geometry.height);
        let max = render_spectrum(&scratch.magnitude, &mut out);
        if max == 0.0 {
            debug!("frame has no energy above the noise floor outside the DC term");
        }
        if self.show_grid {
            draw_grid(&mut out);
        }

        debug!(
            "rendered {}x{} spectrum in {:?} (max {:.3})",
            geometry.width,
            geometry.height,
            started.elapsed(),
            max
        );
        Ok(out)
    }
}

impl Drop for FftSpectrum {
    fn drop(&mut self) {
        self.backend
            .release(self.input_info.width, self.input_info.height);
    }
}
