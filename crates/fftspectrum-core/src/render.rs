//! Spectrum rendering: range detection, thresholding, normalisation and the
//! quadrant swap that moves the DC term to the image centre.
//!
//! The normalisation maximum is taken over every sample *except* index 0.
//! The DC term is usually orders of magnitude above everything else and
//! would otherwise push the whole non-DC spectrum to black. Samples at or
//! below half of that maximum are suppressed; the rest are scaled so the
//! maximum maps to 255.
//!
//! A single-precision transform leaves rounding noise in bins that are
//! mathematically zero, at a level proportional to the DC magnitude. A frame
//! whose non-DC maximum does not rise above that noise floor renders black.

use ndarray::Array2;

use crate::types::{MagnitudeField, Plane};

/// Largest magnitude in `field`, skipping the DC term at flat index 0.
///
/// Returns 0 for fields with fewer than two samples.
pub fn max_excluding_dc(field: &MagnitudeField) -> f32 {
    field.iter().skip(1).fold(0.0_f32, |max, &v| if v > max { v } else { max })
}

/// Rounding noise allowance, in units of `f32::EPSILON` times the DC magnitude.
pub const NOISE_FLOOR_ULPS: f32 = 256.0;

/// Log-magnitude below which a non-DC bin is indistinguishable from the
/// transform's rounding noise.
///
/// Returns 0 for empty fields and for a zero DC term.
pub fn noise_floor(field: &MagnitudeField) -> f32 {
    let Some(&dc) = field.iter().next() else {
        return 0.0;
    };
    // The field stores ln(1 + |z|); undo it to scale the linear magnitude.
    let linear = NOISE_FLOOR_ULPS * f32::EPSILON * dc.exp_m1();
    if linear > 0.0 {
        linear.ln_1p()
    } else {
        0.0
    }
}

/// Map a magnitude to an 8-bit intensity given the non-DC maximum.
///
/// A non-positive (or NaN) `max` means the field carries no energy outside
/// DC; everything maps to 0 instead of dividing by zero.
#[inline]
pub fn intensity(value: f32, max: f32) -> u8 {
    if !(max > 0.0) || !(value > max / 2.0) {
        return 0;
    }
    (255.0 * value / max).clamp(0.0, 255.0).round() as u8
}

/// Destination of index `i` along an axis of length `n` after the quadrant
/// swap.
///
/// For even `n` this sends the lower half up by `n / 2` and the upper half
/// down by `n / 2`. For odd `n` the same rotation is applied modulo `n`, so
/// every destination is written exactly once and index 0 lands on `n / 2`.
#[inline]
pub fn shift_index(i: usize, n: usize) -> usize {
    let half = n / 2;
    if i + half < n {
        i + half
    } else {
        i + half - n
    }
}

/// Quadrant-swapped copy of a 2D array (the classic `fftshift`).
///
/// Reference form of the swap. [`render_spectrum`] applies [`shift_index`]
/// while writing instead of materialising a shifted copy.
pub fn fft_shift<T: Clone>(src: &Array2<T>) -> Array2<T> {
    let (h, w) = src.dim();
    Array2::from_shape_fn((h, w), |(y, x)| {
        // Inverse of `shift_index`: rotate back by `n / 2`.
        let sy = (y + h - h / 2) % h;
        let sx = (x + w - w / 2) % w;
        src[[sy, sx]].clone()
    })
}

/// Render `field` into `out` and return the non-DC maximum used for scaling.
///
/// `out` is cleared first; it must have the same width and height as the
/// field. Returns 0 and leaves `out` black when the maximum is not above
/// [`noise_floor`].
pub fn render_spectrum(field: &MagnitudeField, out: &mut Plane) -> f32 {
    let (height, width) = field.dim();
    debug_assert_eq!((out.width(), out.height()), (width, height));

    for y in 0..out.height() {
        out.row_mut(y).fill(0);
    }

    let max = max_excluding_dc(field);
    if !(max > 0.0 && max > noise_floor(field)) {
        return 0.0;
    }

    for (y, row) in field.outer_iter().enumerate() {
        let dst = out.row_mut(shift_index(y, height));
        for (x, &value) in row.iter().enumerate() {
            dst[shift_index(x, width)] = intensity(value, max);
        }
    }
    max
}
