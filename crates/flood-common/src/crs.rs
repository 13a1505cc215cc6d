//! Coordinate reference systems and affine geotransforms.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG code of WGS84 geographic coordinates.
pub const WGS84_EPSG: u32 = 4326;

/// OGC well-known text for EPSG:4326, as exported by GDAL.
const WGS84_WKT: &str = concat!(
    r#"GEOGCS["WGS 84",DATUM["WGS_1984","#,
    r#"SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],"#,
    r#"AUTHORITY["EPSG","6326"]],"#,
    r#"PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],"#,
    r#"UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],"#,
    r#"AUTHORITY["EPSG","4326"]]"#
);

/// A spatial reference: the EPSG code it was resolved from plus its WKT.
///
/// The WKT is empty when the code could not be resolved. Writers treat an
/// empty WKT as "no projection" rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialReference {
    epsg: Option<u32>,
    wkt: String,
}

impl SpatialReference {
    /// Resolve an EPSG code against the built-in registry.
    pub fn from_epsg(code: u32) -> Self {
        let wkt = match code {
            WGS84_EPSG => WGS84_WKT.to_string(),
            _ => String::new(),
        };
        Self {
            epsg: Some(code),
            wkt,
        }
    }

    /// WGS84 geographic (EPSG:4326).
    pub fn wgs84() -> Self {
        Self::from_epsg(WGS84_EPSG)
    }

    /// A reference with no projection information.
    pub fn unknown() -> Self {
        Self {
            epsg: None,
            wkt: String::new(),
        }
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    /// True when there is no WKT to attach to a raster.
    pub fn is_empty(&self) -> bool {
        self.wkt.is_empty()
    }

    /// Human-readable datum name, taken from the WKT header.
    pub fn citation(&self) -> Option<&str> {
        let rest = self.wkt.split_once('"')?.1;
        rest.split_once('"').map(|(name, _)| name)
    }

    /// True if this resolves to a geographic (lat/lon) system.
    pub fn is_geographic(&self) -> bool {
        !self.is_empty() && self.wkt.starts_with("GEOGCS")
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.epsg {
            Some(code) => write!(f, "EPSG:{}", code),
            None => write!(f, "unknown"),
        }
    }
}

/// Six-term affine transform from pixel (col, row) to map coordinates.
///
/// Term order follows the GDAL convention:
/// `(origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// A north-up transform with no rotation terms.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        }
    }

    pub fn from_array(terms: [f64; 6]) -> Self {
        Self {
            origin_x: terms[0],
            pixel_width: terms[1],
            row_rotation: terms[2],
            origin_y: terms[3],
            col_rotation: terms[4],
            pixel_height: terms[5],
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// True when both rotation terms are zero.
    pub fn is_north_up(&self) -> bool {
        self.row_rotation == 0.0 && self.col_rotation == 0.0
    }

    /// Map coordinates of the top-left corner of pixel (col, row).
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_resolves() {
        let srs = SpatialReference::wgs84();
        assert_eq!(srs.epsg(), Some(4326));
        assert!(!srs.is_empty());
        assert!(srs.is_geographic());
        assert!(srs.wkt().ends_with(r#"AUTHORITY["EPSG","4326"]]"#));
        assert_eq!(srs.citation(), Some("WGS 84"));
        assert_eq!(srs.to_string(), "EPSG:4326");
    }

    #[test]
    fn test_unknown_code_has_empty_wkt() {
        let srs = SpatialReference::from_epsg(999_999);
        assert!(srs.is_empty());
        assert_eq!(srs.citation(), None);
        assert!(!srs.is_geographic());
    }

    #[test]
    fn test_transform_array_order() {
        let gt = GeoTransform::north_up(-180.0, 90.0, 18.0, -18.0);
        assert_eq!(gt.to_array(), [-180.0, 18.0, 0.0, 90.0, 0.0, -18.0]);
        assert_eq!(GeoTransform::from_array(gt.to_array()), gt);
        assert!(gt.is_north_up());
    }

    #[test]
    fn test_pixel_to_geo() {
        let gt = GeoTransform::north_up(-180.0, 90.0, 18.0, -18.0);
        assert_eq!(gt.pixel_to_geo(0.0, 0.0), (-180.0, 90.0));
        assert_eq!(gt.pixel_to_geo(20.0, 10.0), (180.0, -90.0));
    }
}
