//! # FFTSpectrum Core
//!
//! Renders the magnitude spectrum of 8-bit luma frames. Each frame is widened
//! to a complex field, transformed with a 2D forward DFT, reduced to a
//! log-magnitude field, normalised against the strongest non-DC component
//! and quadrant-swapped so the DC term sits at the image centre.
//!
//! ## Architecture
//!
//! The DFT itself is delegated to a
//! [`SpectrumBackend`](fftspectrum_compute::SpectrumBackend), which owns the
//! per-geometry plan. [`filter::FftSpectrum`] validates the clip once and then
//! runs the per-frame pipeline with caller-owned scratch buffers.
//!
//! ## Modules
//!
//! - [`types`] — Clip metadata, image planes and dense fields.
//! - [`convert`] — 8-bit plane to complex field.
//! - [`magnitude`] — Log-magnitude of a complex spectrum.
//! - [`render`] — Thresholding, normalisation and quadrant swap.
//! - [`grid`] — Reference grid overlay.
//! - [`filter`] — Validation and the per-frame pipeline.
//! - [`source`] — Frame sources and parallel clip rendering.

pub mod convert;
pub mod filter;
pub mod grid;
pub mod magnitude;
pub mod render;
pub mod source;
pub mod types;

pub use filter::{FftSpectrum, FftSpectrumOptions, FilterError, SpectrumScratch};
pub use source::{render_clip, FrameSource, MemorySource};
pub use types::{ColorFamily, Geometry, Plane, SampleType, VideoFormat, VideoInfo};
