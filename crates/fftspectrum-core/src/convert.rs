//! Pixel plane to complex field conversion.
//!
//! Each 8-bit sample becomes `value + 0i`. Rows are walked in fixed blocks of
//! [`BLOCK`] samples so the widening loop vectorises, with a scalar tail for
//! widths that are not a multiple of the block size. Stride padding is
//! dropped: the field is always dense.

use num_complex::Complex32;

use crate::types::{ComplexField, Plane};

/// Samples widened per block in the bulk path.
pub const BLOCK: usize = 16;

/// Expand `src` into `dst`. `dst` must have the same geometry as `src`.
pub fn fill_complex_field(src: &Plane, dst: &mut ComplexField) {
    debug_assert_eq!(src.geometry(), dst.geometry);
    let width = src.width();

    for (row, out) in src.rows().zip(dst.data.chunks_exact_mut(width)) {
        let mut blocks = row.chunks_exact(BLOCK);
        let mut out_blocks = out.chunks_exact_mut(BLOCK);
        for (block, out_block) in (&mut blocks).zip(&mut out_blocks) {
            widen_block(block, out_block);
        }
        for (&sample, value) in blocks.remainder().iter().zip(out_blocks.into_remainder()) {
            *value = Complex32::new(sample as f32, 0.0);
        }
    }
}

#[inline(always)]
fn widen_block(block: &[u8], out: &mut [Complex32]) {
    for (value, &sample) in out[..BLOCK].iter_mut().zip(&block[..BLOCK]) {
        value.re = sample as f32;
        value.im = 0.0;
    }
}

/// Sample-at-a-time reference conversion.
///
/// Not used by the filter; kept as the oracle that [`fill_complex_field`] is
/// checked against in tests.
pub fn fill_complex_field_scalar(src: &Plane, dst: &mut ComplexField) {
    let width = src.width();
    for y in 0..src.height() {
        for x in 0..width {
            dst.data[y * width + x] = Complex32::new(src.get(x, y) as f32, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned_plane(width: usize, height: usize, stride: usize) -> Plane {
        let data = (0..stride * height)
            .map(|i| if i % stride < width { (i * 29 % 256) as u8 } else { 0xAA })
            .collect();
        Plane::from_raw(width, height, stride, data).unwrap()
    }

    #[test]
    fn test_bulk_matches_scalar_for_all_tail_lengths() {
        for width in 1..=(2 * BLOCK + 3) {
            let plane = patterned_plane(width, 3, width + 7);
            let mut bulk = ComplexField::zeros(plane.geometry());
            let mut scalar = ComplexField::zeros(plane.geometry());
            fill_complex_field(&plane, &mut bulk);
            fill_complex_field_scalar(&plane, &mut scalar);
            assert_eq!(bulk, scalar, "width {}", width);
        }
    }

    #[test]
    fn test_padding_is_not_copied() {
        let plane = patterned_plane(5, 2, 8);
        let mut field = ComplexField::zeros(plane.geometry());
        fill_complex_field(&plane, &mut field);

        assert_eq!(field.data.len(), 10);
        for (i, value) in field.data.iter().enumerate() {
            let (x, y) = (i % 5, i / 5);
            assert_eq!(value.re, plane.get(x, y) as f32);
            assert_eq!(value.im, 0.0);
        }
    }

    #[test]
    fn test_overwrites_stale_imaginary_parts() {
        let plane = Plane::from_packed(BLOCK + 1, 1, vec![7; BLOCK + 1]).unwrap();
        let mut field = ComplexField::zeros(plane.geometry());
        field.data.fill(Complex32::new(-1.0, 3.0));
        fill_complex_field(&plane, &mut field);
        assert!(field.data.iter().all(|v| *v == Complex32::new(7.0, 0.0)));
    }
}
