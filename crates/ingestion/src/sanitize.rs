//! Raster sanitization: sentinel masking and north-up reorientation.

use flood_common::{Grid2D, NO_DATA};

/// Values below this are fill markers from the source format.
pub const LOWER_BOUND: f64 = -9990.0;

/// Values above this are overflow markers from the source format.
pub const UPPER_BOUND: f64 = 1e19;

/// Masks out-of-range cells and flips a south-up grid to north-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSanitizer {
    lower: f64,
    upper: f64,
    no_data: f32,
}

impl Default for RasterSanitizer {
    fn default() -> Self {
        Self::new(NO_DATA)
    }
}

/// A sanitized grid plus the number of cells replaced by no-data.
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
    pub grid: Grid2D,
    pub masked: usize,
}

impl RasterSanitizer {
    pub fn new(no_data: f32) -> Self {
        Self {
            lower: LOWER_BOUND,
            upper: UPPER_BOUND,
            no_data,
        }
    }

    pub fn no_data(&self) -> f32 {
        self.no_data
    }

    /// Replace every cell `< -9990` or `> 1e19` with no-data, narrow to
    /// `f32`, then reverse the row order.
    ///
    /// Bounds are checked on the `f64` source values, before narrowing, so
    /// cells just above 1e19 or beyond the `f32` range are still masked. NaN
    /// cells fail both comparisons and are left as they are. Call exactly
    /// once per slice: the flip is not idempotent.
    pub fn sanitize(&self, grid: Grid2D<f64>) -> Sanitized {
        let mut masked = 0;
        let mut grid = grid.map(|v| {
            if v < self.lower || v > self.upper {
                masked += 1;
                self.no_data
            } else {
                v as f32
            }
        });
        grid.flip_rows();
        Sanitized { grid, masked }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_out_of_range() {
        let grid = Grid2D::new(1, 5, vec![-9995.0, 2e19, 1.5, -9990.0, 1e19]).unwrap();
        let out = RasterSanitizer::default().sanitize(grid);
        assert_eq!(out.masked, 2);
        assert_eq!(out.grid.data(), &[-9999.0, -9999.0, 1.5, -9990.0, 1e19]);
    }

    #[test]
    fn test_flips_rows() {
        let grid = Grid2D::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let out = RasterSanitizer::default().sanitize(grid);
        assert_eq!(out.masked, 0);
        assert_eq!(out.grid.data(), &[5.0, 6.0, 3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_mask_then_flip() {
        // Row 0 holds the sentinel; after the flip it is the last row.
        let grid = Grid2D::new(2, 2, vec![-1e30, 0.0, 7.0, 8.0]).unwrap();
        let out = RasterSanitizer::default().sanitize(grid);
        assert_eq!(out.grid.row(0), Some(&[7.0, 8.0][..]));
        assert_eq!(out.grid.row(1), Some(&[-9999.0, 0.0][..]));
    }

    #[test]
    fn test_existing_no_data_is_kept() {
        let grid = Grid2D::new(1, 2, vec![-9999.0, 0.0]).unwrap();
        let out = RasterSanitizer::default().sanitize(grid);
        assert_eq!(out.masked, 1);
        assert_eq!(out.grid.data(), &[-9999.0, 0.0]);
    }

    #[test]
    fn test_bounds_checked_before_narrowing() {
        // 1.0000000003e19 rounds to just below 1e19 as f32.
        assert!((1.0000000003e19_f64 as f32 as f64) < UPPER_BOUND);
        let grid = Grid2D::new(1, 4, vec![1.0000000003e19, 1e300, -1e300, 42.5]).unwrap();
        let out = RasterSanitizer::default().sanitize(grid);
        assert_eq!(out.masked, 3);
        assert_eq!(out.grid.data(), &[-9999.0, -9999.0, -9999.0, 42.5]);
    }

    #[test]
    fn test_nan_untouched() {
        let grid = Grid2D::new(1, 2, vec![f64::NAN, 1.0]).unwrap();
        let out = RasterSanitizer::default().sanitize(grid);
        assert_eq!(out.masked, 0);
        assert!(out.grid.data()[0].is_nan());
    }

    #[test]
    fn test_infinities_masked() {
        let grid = Grid2D::new(1, 2, vec![f64::INFINITY, f64::NEG_INFINITY]).unwrap();
        let out = RasterSanitizer::new(-1.0).sanitize(grid);
        assert_eq!(out.grid.data(), &[-1.0, -1.0]);
    }
}
