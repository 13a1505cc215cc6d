//! Test data generators for synthetic inundation grids.
//!
//! These generators create predictable, verifiable patterns so tests can
//! check row order and cell placement after conversion.

/// Creates a grid where each cell encodes its own position.
///
/// Each cell value is `row * 1000 + col`, so a flipped or transposed grid
/// is easy to spot.
///
/// # Example
///
/// ```
/// use test_utils::index_grid;
///
/// let grid = index_grid(3, 4);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[1], 1.0);    // row=0, col=1
/// assert_eq!(grid[4], 1000.0); // row=1, col=0
/// ```
pub fn index_grid(rows: usize, cols: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            data.push((row * 1000 + col) as f32);
        }
    }
    data
}

/// Creates a grid of plausible flood depths in metres.
///
/// Depths increase towards the centre of the grid and stay within 0..=5.
pub fn depth_grid(rows: usize, cols: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(rows * cols);
    let cy = (rows as f32 - 1.0) / 2.0;
    let cx = (cols as f32 - 1.0) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    for row in 0..rows {
        for col in 0..cols {
            let dy = row as f32 - cy;
            let dx = col as f32 - cx;
            let dist = (dx * dx + dy * dy).sqrt();
            data.push(5.0 * (1.0 - dist / max_dist));
        }
    }
    data
}

/// Overwrite the given `(row, col)` cells of a row-major grid.
pub fn set_cells(data: &mut [f32], cols: usize, cells: &[(usize, usize, f32)]) {
    for &(row, col, value) in cells {
        data[row * cols + col] = value;
    }
}
