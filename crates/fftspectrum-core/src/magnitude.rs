//! Log-magnitude of a complex spectrum.
//!
//! $m = \ln(1 + |z|)$ compresses the dynamic range of Fourier magnitudes,
//! which is dominated by the DC term, into something worth displaying.

use ndarray::{Array2, ShapeError};
use num_complex::Complex32;

use crate::types::{Geometry, MagnitudeField};

/// Samples processed per block in the bulk path.
const LANES: usize = 4;

#[inline(always)]
fn log_magnitude(z: Complex32) -> f32 {
    (z.re * z.re + z.im * z.im).sqrt().ln_1p()
}

/// Fill `out` with the log-magnitude of `spectrum`, in row-major order.
pub fn compute_log_magnitude(spectrum: &[Complex32], out: &mut MagnitudeField) {
    debug_assert_eq!(spectrum.len(), out.len());
    match out.as_slice_mut() {
        Some(dst) => log_magnitude_slice(spectrum, dst),
        None => {
            for (m, &z) in out.iter_mut().zip(spectrum) {
                *m = log_magnitude(z);
            }
        }
    }
}

fn log_magnitude_slice(spectrum: &[Complex32], dst: &mut [f32]) {
    let mut src_blocks = spectrum.chunks_exact(LANES);
    let mut dst_blocks = dst.chunks_exact_mut(LANES);
    for (src, out) in (&mut src_blocks).zip(&mut dst_blocks) {
        for (m, &z) in out.iter_mut().zip(src) {
            *m = log_magnitude(z);
        }
    }
    for (m, &z) in dst_blocks.into_remainder().iter_mut().zip(src_blocks.remainder()) {
        *m = log_magnitude(z);
    }
}

/// Allocate and fill a magnitude field for `spectrum`.
///
/// Allocating reference form of [`compute_log_magnitude`]. The filter writes
/// into reused scratch instead; this is for tests and one-off callers.
pub fn magnitude_field(
    spectrum: &[Complex32],
    geometry: Geometry,
) -> Result<MagnitudeField, ShapeError> {
    let values = spectrum.iter().map(|&z| log_magnitude(z)).collect();
    Array2::from_shape_vec((geometry.height, geometry.width), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_values() {
        let spectrum = [
            Complex32::new(0.0, 0.0),
            Complex32::new(3.0, 4.0),
            Complex32::new(-3.0, -4.0),
            Complex32::new(0.0, 1.0),
            Complex32::new(8160.0, 0.0),
        ];
        let mut out = MagnitudeField::zeros((1, 5));
        compute_log_magnitude(&spectrum, &mut out);

        assert_eq!(out[[0, 0]], 0.0);
        assert_relative_eq!(out[[0, 1]], 6.0_f32.ln(), epsilon = 1e-6);
        assert_relative_eq!(out[[0, 2]], 6.0_f32.ln(), epsilon = 1e-6);
        assert_relative_eq!(out[[0, 3]], 2.0_f32.ln(), epsilon = 1e-6);
        assert_relative_eq!(out[[0, 4]], 8161.0_f32.ln(), epsilon = 1e-6);
    }

    #[test]
    fn test_tail_lengths_match_allocating_path() {
        for n in 1..=11 {
            let spectrum: Vec<Complex32> = (0..n)
                .map(|i| Complex32::new(i as f32 * 1.5, -(i as f32)))
                .collect();
            let mut out = MagnitudeField::zeros((1, n));
            compute_log_magnitude(&spectrum, &mut out);
            let expected = magnitude_field(&spectrum, Geometry::new(n, 1)).unwrap();
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn test_column_major_output_uses_fallback() {
        let spectrum: Vec<Complex32> = (0..6).map(|i| Complex32::new(i as f32, 0.0)).collect();
        let mut transposed = MagnitudeField::zeros((2, 3)).reversed_axes();
        assert!(transposed.as_slice_mut().is_none());
        compute_log_magnitude(&spectrum, &mut transposed);
        assert_relative_eq!(transposed[[0, 1]], 2.0_f32.ln(), epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let spectrum = vec![Complex32::new(1.0, 0.0); 5];
        assert!(magnitude_field(&spectrum, Geometry::new(2, 2)).is_err());
    }
}
