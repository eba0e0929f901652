//! Reference grid burned over the rendered spectrum.
//!
//! Lines are spaced [`GRID_PERIOD`] pixels apart and phased so that one
//! vertical and one horizontal line cross at `(width / 2, height / 2)`,
//! where the DC term sits after the quadrant swap.

use crate::types::Plane;

/// Distance between grid lines, in pixels.
pub const GRID_PERIOD: usize = 100;

/// Positions of grid lines along an axis of length `n`.
pub fn grid_lines(n: usize) -> impl Iterator<Item = usize> {
    ((n / 2) % GRID_PERIOD..n).step_by(GRID_PERIOD)
}

/// Overwrite grid rows and columns of `plane` with full intensity.
pub fn draw_grid(plane: &mut Plane) {
    let (width, height) = (plane.width(), plane.height());

    for y in 0..height {
        let row = plane.row_mut(y);
        for x in grid_lines(width) {
            row[x] = 255;
        }
    }
    for y in grid_lines(height) {
        plane.row_mut(y).fill(255);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_positions() {
        assert_eq!(grid_lines(400).collect::<Vec<_>>(), vec![0, 100, 200, 300]);
        assert_eq!(grid_lines(300).collect::<Vec<_>>(), vec![50, 150, 250]);
        assert_eq!(grid_lines(1).collect::<Vec<_>>(), vec![0]);
        assert_eq!(grid_lines(64).collect::<Vec<_>>(), vec![32]);
        assert_eq!(grid_lines(0).count(), 0);
    }

    #[test]
    fn test_draws_full_rows_and_columns() {
        let mut plane = Plane::zeroed(250, 120);
        draw_grid(&mut plane);

        // Columns at 25, 125, 225; rows at 60.
        for y in 0..120 {
            for x in 0..250 {
                let on_line = x % 100 == 25 || y == 60;
                assert_eq!(plane.get(x, y) == 255, on_line, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_leaves_stride_padding_alone() {
        let mut plane = Plane::from_raw(3, 2, 5, vec![0; 10]).unwrap();
        draw_grid(&mut plane);
        assert_eq!(plane.get(1, 0), 255);
        assert_eq!(plane.get(0, 1), 255);
        assert_eq!(plane.get(0, 0), 0);
        assert_eq!(plane.get(3, 0), 0);
        assert_eq!(plane.get(4, 1), 0);
    }
}
