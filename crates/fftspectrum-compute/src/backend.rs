//! Forward-transform backend trait and device abstraction.
//!
//! The [`SpectrumBackend`] trait abstracts over the library that performs the
//! 2D forward DFT so that the rendering code in `fftspectrum-core` never
//! touches planning or execution details. Plans are expensive to build and
//! cheap to reuse, so backends cache one per frame geometry.

use num_complex::Complex32;
use thiserror::Error;

/// Errors originating from transform backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Invalid transform dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Buffer length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Device error: {0}")]
    DeviceError(String),
}

/// Describes the capabilities of a transform backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub compute_units: Option<usize>,
}

/// The type of transform backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Cpu,
}

/// Abstraction over forward 2D DFT engines.
///
/// Implementations must be safe to call concurrently for the same geometry:
/// a cached plan is shared read-only and any working memory is per call.
pub trait SpectrumBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Build and cache the plan for a `width` x `height` field and take a
    /// reference to it.
    ///
    /// A geometry that is already planned reuses its plan. Each call must be
    /// balanced by one [`release`](Self::release).
    fn prepare(&self, width: usize, height: usize) -> Result<(), ComputeError>;

    /// Compute the unnormalised forward 2D DFT of a row-major field.
    ///
    /// $X[k, l] = \sum_{y, x} x[y, x] \, e^{-2\pi i (k y / H + l x / W)}$
    ///
    /// `input` may be overwritten. Both buffers must hold exactly
    /// `width * height` elements.
    fn forward_2d(
        &self,
        input: &mut [Complex32],
        output: &mut [Complex32],
        width: usize,
        height: usize,
    ) -> Result<(), ComputeError>;

    /// Give back a reference taken by [`prepare`](Self::prepare). The plan is
    /// freed once no references remain.
    fn release(&self, width: usize, height: usize);

    /// Number of geometries with a live cached plan.
    fn cached_plans(&self) -> usize;
}

/// Check the shared preconditions of [`SpectrumBackend::forward_2d`].
pub fn check_buffers(
    input: &[Complex32],
    output: &[Complex32],
    width: usize,
    height: usize,
) -> Result<(), ComputeError> {
    if width == 0 || height == 0 {
        return Err(ComputeError::InvalidDimensions { width, height });
    }
    let expected = width * height;
    for actual in [input.len(), output.len()] {
        if actual != expected {
            return Err(ComputeError::LengthMismatch { expected, actual });
        }
    }
    Ok(())
}
