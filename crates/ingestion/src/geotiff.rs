//! Single-band Float32 GeoTIFF writer.
//!
//! Georeferencing is stored with the standard GeoTIFF tags rather than a
//! GDAL sidecar, so the files are self-describing:
//!
//! - `ModelPixelScaleTag` (33550) and `ModelTiepointTag` (33922) carry the
//!   north-up geotransform.
//! - `GeoKeyDirectoryTag` (34735) and `GeoAsciiParamsTag` (34737) carry the
//!   geographic coordinate system, when one is known.
//! - `GDAL_NODATA` (42113) carries the no-data value as ASCII.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tiff::encoder::compression::{Compression, Deflate, Lzw, Uncompressed};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tracing::debug;

use flood_common::{GeoTransform, Grid2D, SpatialReference};

use crate::config::RasterCompression;
use crate::error::{IngestionError, Result};
use crate::georef::Georeference;

pub const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
pub const MODEL_TIEPOINT_TAG: u16 = 33922;
pub const GEO_KEY_DIRECTORY_TAG: u16 = 34735;
pub const GEO_ASCII_PARAMS_TAG: u16 = 34737;
pub const GDAL_NODATA_TAG: u16 = 42113;

// GeoKey ids and values (GeoTIFF 1.0, section 6).
const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const GEOG_CITATION: u16 = 2049;
const GEOG_ANGULAR_UNITS: u16 = 2054;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
const ANGULAR_DEGREE: u16 = 9102;

/// Writes sanitized grids as compressed GeoTIFFs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterWriter {
    compression: RasterCompression,
}

impl RasterWriter {
    pub fn new(compression: RasterCompression) -> Self {
        Self { compression }
    }

    /// Write `grid` to `path`, replacing any existing file.
    ///
    /// The image is `grid.cols()` wide and `grid.rows()` high, row 0 at the
    /// top. A failure part way through can leave a truncated file behind.
    pub fn write(
        &self,
        path: &Path,
        georef: &Georeference,
        grid: &Grid2D,
        no_data: f32,
    ) -> Result<()> {
        let width = u32::try_from(grid.cols())
            .map_err(|_| IngestionError::RasterWrite(format!("width {} too large", grid.cols())))?;
        let height = u32::try_from(grid.rows())
            .map_err(|_| IngestionError::RasterWrite(format!("height {} too large", grid.rows())))?;

        let write_err = |e: std::io::Error| {
            IngestionError::RasterWrite(format!("{}: {}", path.display(), e))
        };
        let mut file = BufWriter::new(File::create(path).map_err(write_err)?);
        let tags = GeoTags::new(&georef.transform, &georef.spatial_ref, no_data);

        match self.compression {
            RasterCompression::Lzw => {
                encode(&mut file, width, height, grid.data(), &tags, Lzw::default())?
            }
            RasterCompression::Deflate => {
                encode(&mut file, width, height, grid.data(), &tags, Deflate::default())?
            }
            RasterCompression::None => encode(
                &mut file,
                width,
                height,
                grid.data(),
                &tags,
                Uncompressed::default(),
            )?,
        }
        file.flush().map_err(write_err)?;

        debug!(
            path = %path.display(),
            width,
            height,
            compression = %self.compression,
            srs = %georef.spatial_ref,
            "Wrote GeoTIFF"
        );
        Ok(())
    }
}

/// Tag payloads derived from a georeference.
struct GeoTags {
    pixel_scale: [f64; 3],
    tiepoint: [f64; 6],
    geo_keys: Option<Vec<u16>>,
    citation: String,
    no_data: String,
}

impl GeoTags {
    fn new(transform: &GeoTransform, srs: &SpatialReference, no_data: f32) -> Self {
        let citation = format!("{}|", srs.citation().unwrap_or_default());
        let geo_keys = match srs.epsg() {
            Some(code) if srs.is_geographic() => u16::try_from(code).ok().map(|code| {
                geographic_keys(code, citation.len() as u16)
            }),
            _ => None,
        };

        Self {
            pixel_scale: [transform.pixel_width.abs(), transform.pixel_height.abs(), 0.0],
            tiepoint: [0.0, 0.0, 0.0, transform.origin_x, transform.origin_y, 0.0],
            geo_keys,
            citation,
            no_data: no_data.to_string(),
        }
    }
}

/// GeoKeyDirectory for a geographic CRS identified by EPSG code.
fn geographic_keys(epsg: u16, citation_len: u16) -> Vec<u16> {
    let keys: [[u16; 4]; 5] = [
        [GT_MODEL_TYPE, 0, 1, MODEL_TYPE_GEOGRAPHIC],
        [GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA],
        [GEOGRAPHIC_TYPE, 0, 1, epsg],
        [GEOG_CITATION, GEO_ASCII_PARAMS_TAG, citation_len, 0],
        [GEOG_ANGULAR_UNITS, 0, 1, ANGULAR_DEGREE],
    ];

    // Header: directory version, key revision, minor revision, key count.
    let mut directory = vec![1, 1, 0, keys.len() as u16];
    for key in keys {
        directory.extend_from_slice(&key);
    }
    directory
}

fn encode<W: Write + Seek, D: Compression>(
    writer: &mut W,
    width: u32,
    height: u32,
    data: &[f32],
    tags: &GeoTags,
    compression: D,
) -> Result<()> {
    let mut tiff = TiffEncoder::new(writer)?;
    let mut image =
        tiff.new_image_with_compression::<colortype::Gray32Float, D>(width, height, compression)?;

    let dir = image.encoder();
    dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE_TAG), &tags.pixel_scale[..])?;
    dir.write_tag(Tag::Unknown(MODEL_TIEPOINT_TAG), &tags.tiepoint[..])?;
    if let Some(keys) = &tags.geo_keys {
        dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY_TAG), &keys[..])?;
        dir.write_tag(Tag::Unknown(GEO_ASCII_PARAMS_TAG), tags.citation.as_str())?;
    }
    dir.write_tag(Tag::Unknown(GDAL_NODATA_TAG), tags.no_data.as_str())?;

    image.write_data(data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::georef::GeoreferenceBuilder;
    use tiff::decoder::{Decoder, DecodingResult};

    fn sample_grid() -> Grid2D {
        Grid2D::new(2, 4, vec![0.0, 1.0, 2.0, 3.0, -9999.0, 5.0, 6.0, 7.5]).unwrap()
    }

    fn read_back(path: &Path) -> Decoder<File> {
        Decoder::new(File::open(path).unwrap()).unwrap()
    }

    #[test]
    fn test_geographic_keys_layout() {
        let keys = geographic_keys(4326, 7);
        assert_eq!(
            keys,
            vec![
                1, 1, 0, 5, 1024, 0, 1, 2, 1025, 0, 1, 1, 2048, 0, 1, 4326, 2049, 34737, 7, 0,
                2054, 0, 1, 9102
            ]
        );
    }

    #[test]
    fn test_write_and_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tif");
        let georef = GeoreferenceBuilder::default().build(2, 4).unwrap();

        RasterWriter::default()
            .write(&path, &georef, &sample_grid(), -9999.0)
            .unwrap();

        let mut decoder = read_back(&path);
        assert_eq!(decoder.dimensions().unwrap(), (4, 2));

        let scale = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE_TAG)).unwrap();
        assert_eq!(scale, vec![90.0, 90.0, 0.0]);
        let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT_TAG)).unwrap();
        assert_eq!(tiepoint, vec![0.0, 0.0, 0.0, -180.0, 90.0, 0.0]);

        let keys = decoder.get_tag_u16_vec(Tag::Unknown(GEO_KEY_DIRECTORY_TAG)).unwrap();
        assert_eq!(keys[15], 4326);
        let citation = decoder
            .get_tag_ascii_string(Tag::Unknown(GEO_ASCII_PARAMS_TAG))
            .unwrap();
        assert_eq!(citation.trim_end_matches('\0'), "WGS 84|");
        let nodata = decoder.get_tag_ascii_string(Tag::Unknown(GDAL_NODATA_TAG)).unwrap();
        assert_eq!(nodata.trim_end_matches('\0'), "-9999");

        match decoder.read_image().unwrap() {
            DecodingResult::F32(values) => assert_eq!(values, sample_grid().into_data()),
            other => panic!("unexpected sample type: {:?}", std::mem::discriminant(&other)),
        }
    }

    #[test]
    fn test_each_compression_round_trips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let georef = GeoreferenceBuilder::default().build(2, 4).unwrap();
        for compression in [
            RasterCompression::None,
            RasterCompression::Lzw,
            RasterCompression::Deflate,
        ] {
            let path = dir.path().join(format!("{}.tif", compression));
            RasterWriter::new(compression)
                .write(&path, &georef, &sample_grid(), -9999.0)
                .unwrap();
            match read_back(&path).read_image().unwrap() {
                DecodingResult::F32(values) => assert_eq!(values.len(), 8),
                _ => panic!("expected f32 samples for {}", compression),
            }
        }
    }

    #[test]
    fn test_empty_wkt_writes_no_geokeys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.tif");
        let georef = GeoreferenceBuilder::with_epsg(999_999).build(2, 4).unwrap();

        RasterWriter::default()
            .write(&path, &georef, &sample_grid(), -9999.0)
            .unwrap();

        let mut decoder = read_back(&path);
        assert!(decoder
            .get_tag_u16_vec(Tag::Unknown(GEO_KEY_DIRECTORY_TAG))
            .is_err());
        assert!(decoder
            .get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT_TAG))
            .is_ok());
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.tif");
        let georef = GeoreferenceBuilder::default().build(2, 4).unwrap();
        let err = RasterWriter::default()
            .write(&path, &georef, &sample_grid(), -9999.0)
            .unwrap_err();
        assert!(matches!(err, IngestionError::RasterWrite(_)));
    }
}
