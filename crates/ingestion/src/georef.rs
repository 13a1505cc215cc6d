//! Global-extent georeferencing.

use tracing::warn;

use flood_common::{GeoTransform, SpatialReference, WGS84_EPSG};

use crate::error::{IngestionError, Result};

/// Western edge of the global grid.
pub const GLOBAL_WEST: f64 = -180.0;
/// Northern edge of the global grid.
pub const GLOBAL_NORTH: f64 = 90.0;

/// Geotransform and spatial reference for one raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Georeference {
    pub transform: GeoTransform,
    pub spatial_ref: SpatialReference,
}

/// Builds georeferences for grids that span the whole globe.
#[derive(Debug, Clone)]
pub struct GeoreferenceBuilder {
    epsg: u32,
}

impl Default for GeoreferenceBuilder {
    fn default() -> Self {
        Self { epsg: WGS84_EPSG }
    }
}

impl GeoreferenceBuilder {
    /// A builder that tags rasters with `epsg`.
    ///
    /// The extent is always the WGS84 globe; only the attached reference
    /// changes.
    pub fn with_epsg(epsg: u32) -> Self {
        Self { epsg }
    }

    /// Georeference for a `(rows, cols)` grid covering -180..180, -90..90.
    ///
    /// An unresolvable spatial reference is logged and returned with an
    /// empty WKT.
    pub fn build(&self, rows: usize, cols: usize) -> Result<Georeference> {
        if rows == 0 || cols == 0 {
            return Err(IngestionError::InvalidRaster(format!(
                "cannot georeference a {}x{} grid",
                rows, cols
            )));
        }

        let transform = GeoTransform::north_up(
            GLOBAL_WEST,
            GLOBAL_NORTH,
            360.0 / cols as f64,
            -180.0 / rows as f64,
        );

        let spatial_ref = SpatialReference::from_epsg(self.epsg);
        if spatial_ref.is_empty() {
            warn!(
                epsg = self.epsg,
                "No WKT for spatial reference, raster will be written without a projection"
            );
        }

        Ok(Georeference {
            transform,
            spatial_ref,
        })
    }
}
