//! Common types and utilities shared across the inundation pipeline crates.
//!
//! Everything that crosses a crate boundary lives here: attribute mappings
//! extracted from netCDF files, raster grids, geotransforms and spatial
//! references.

pub mod attribute;
pub mod crs;
pub mod error;
pub mod grid;

pub use attribute::{AttributeMap, AttributeValue};
pub use crs::{GeoTransform, SpatialReference, WGS84_EPSG};
pub use error::{CommonError, CommonResult};
pub use grid::Grid2D;

/// No-data sentinel written to every output raster band.
pub const NO_DATA: f32 = -9999.0;
