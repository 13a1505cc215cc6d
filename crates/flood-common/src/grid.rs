//! Dense row-major 2-D raster grids.

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// A 2-D grid of cells stored row-major.
///
/// Source slices are read as `f64` so range checks see the stored values;
/// rasters are written from `Grid2D<f32>`.
///
/// Row 0 is the first row as read from the source; whether that is the
/// northern or southern edge depends on where the grid came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid2D<T = f32> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> Grid2D<T> {
    /// Wrap row-major data, checking it matches the declared shape.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> CommonResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(CommonError::EmptyGrid { rows, cols });
        }
        if data.len() != rows * cols {
            return Err(CommonError::ShapeMismatch {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// A grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> CommonResult<Self> {
        Self::new(rows, cols, vec![value; rows * cols])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        self.data[row * self.cols + col] = value;
        true
    }

    /// Borrow one row.
    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    /// Reverse the row order in place (flip along the first axis).
    pub fn flip_rows(&mut self) {
        let cols = self.cols;
        let rows = self.rows;
        for top in 0..rows / 2 {
            let bottom = rows - 1 - top;
            let (head, tail) = self.data.split_at_mut(bottom * cols);
            head[top * cols..(top + 1) * cols].swap_with_slice(&mut tail[..cols]);
        }
    }

    /// Convert every cell, keeping the shape.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Grid2D<U> {
        Grid2D {
            rows: self.rows,
            cols: self.cols,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
