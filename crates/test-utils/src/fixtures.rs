//! Synthetic inundation netCDF files for tests.
//!
//! The builder writes the same layout the converter expects from real
//! inundation products: `lat`, `lon` and `time` coordinate variables
//! followed by a `(time, lat, lon)` measurement variable declared last.

use std::path::{Path, PathBuf};

use crate::generators::depth_grid;

/// Sample filenames, one per filename schema plus an unrecognized one.
pub mod filenames {
    /// Riverine, 5 tokens: floodtype, climate, model, year, returnperiod.
    pub const FIVE_TOKEN: &str = "inun_rcp4p5_MIROC-ESM-CHEM_2030_0002.nc";

    /// Coastal historical, 6 tokens.
    pub const SIX_TOKEN: &str = "inuncoast_historical_nosub_hist_rp0001_5.nc";

    /// Coastal projection, 8 tokens.
    pub const EIGHT_TOKEN: &str = "inuncoast_rcp8p5_wtsub_2080_rp1000_0_perc_50.nc";

    /// 4 tokens, matches no schema.
    pub const UNRECOGNIZED: &str = "inun_rcp4p5_2030_0002.nc";
}

/// Attribute value written into a fixture.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureAttr {
    Text(String),
    Int(i32),
    Double(f64),
}

impl From<&str> for FixtureAttr {
    fn from(s: &str) -> Self {
        FixtureAttr::Text(s.to_string())
    }
}

impl From<i32> for FixtureAttr {
    fn from(v: i32) -> Self {
        FixtureAttr::Int(v)
    }
}

impl From<f64> for FixtureAttr {
    fn from(v: f64) -> Self {
        FixtureAttr::Double(v)
    }
}

/// Storage type of the measurement variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleType {
    #[default]
    Float,
    Double,
}

/// Builder for one synthetic inundation file.
///
/// # Example
///
/// ```ignore
/// let dir = tempfile::tempdir().unwrap();
/// let path = InundationFile::new(filenames::FIVE_TOKEN, 10, 20)
///     .time_units("Days since 1960-01-01")
///     .cell(0, 0, -9995.0)
///     .write_to(dir.path())
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct InundationFile {
    filename: String,
    rows: usize,
    cols: usize,
    time_units: String,
    time_values: Vec<f64>,
    first_slice: Vec<f64>,
    sample_type: SampleType,
    variable_name: String,
    variable_attrs: Vec<(String, FixtureAttr)>,
    global_attrs: Vec<(String, FixtureAttr)>,
    fill_value: Option<f32>,
}

impl InundationFile {
    /// A single-step file with a smooth depth field and typical attributes.
    pub fn new(filename: &str, rows: usize, cols: usize) -> Self {
        Self {
            filename: filename.to_string(),
            rows,
            cols,
            time_units: "Days since 1960-01-01".to_string(),
            time_values: vec![0.0],
            first_slice: depth_grid(rows, cols).into_iter().map(f64::from).collect(),
            sample_type: SampleType::Float,
            variable_name: "inun".to_string(),
            variable_attrs: vec![
                ("units".to_string(), "m".into()),
                ("long_name".to_string(), "Inundation depth".into()),
            ],
            global_attrs: vec![
                ("Conventions".to_string(), "CF-1.6".into()),
                ("institution".to_string(), "Deltares".into()),
                ("version".to_string(), 2i32.into()),
            ],
            fill_value: Some(-9999.0),
        }
    }

    pub fn time_units(mut self, units: &str) -> Self {
        self.time_units = units.to_string();
        self
    }

    /// Time offsets; one step is written per value.
    pub fn time_values(mut self, values: &[f64]) -> Self {
        self.time_values = values.to_vec();
        self
    }

    /// Replace the first time slice. `data` is row-major, in file row order.
    pub fn first_slice(mut self, data: Vec<f32>) -> Self {
        self.first_slice = data.into_iter().map(f64::from).collect();
        self
    }

    /// Set one cell of the first time slice, in file row order.
    ///
    /// Values outside the `f32` range only survive with [`SampleType::Double`].
    pub fn cell(mut self, row: usize, col: usize, value: f64) -> Self {
        self.first_slice[row * self.cols + col] = value;
        self
    }

    pub fn variable_name(mut self, name: &str) -> Self {
        self.variable_name = name.to_string();
        self
    }

    pub fn variable_attr(mut self, name: &str, value: impl Into<FixtureAttr>) -> Self {
        self.variable_attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn global_attr(mut self, name: &str, value: impl Into<FixtureAttr>) -> Self {
        self.global_attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn sample_type(mut self, sample_type: SampleType) -> Self {
        self.sample_type = sample_type;
        self
    }

    pub fn no_fill_value(mut self) -> Self {
        self.fill_value = None;
        self
    }

    /// Latitude cell centres, south to north (the source row order).
    pub fn lats(&self) -> Vec<f64> {
        let step = 180.0 / self.rows as f64;
        (0..self.rows)
            .map(|i| -90.0 + step * (i as f64 + 0.5))
            .collect()
    }

    /// Longitude cell centres, west to east.
    pub fn lons(&self) -> Vec<f64> {
        let step = 360.0 / self.cols as f64;
        (0..self.cols)
            .map(|i| -180.0 + step * (i as f64 + 0.5))
            .collect()
    }

    /// Write the file into `dir` and return its path.
    ///
    /// Later time steps repeat the first slice scaled by the step index.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, netcdf::Error> {
        let path = dir.join(&self.filename);
        let steps = self.time_values.len();
        let mut file = netcdf::create(&path)?;

        for (name, value) in &self.global_attrs {
            match value {
                FixtureAttr::Text(s) => file.add_attribute(name, s.as_str())?,
                FixtureAttr::Int(v) => file.add_attribute(name, *v)?,
                FixtureAttr::Double(v) => file.add_attribute(name, *v)?,
            };
        }

        file.add_dimension("time", steps)?;
        file.add_dimension("lat", self.rows)?;
        file.add_dimension("lon", self.cols)?;

        let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
        lat.put_attribute("units", "degrees_north")?;
        lat.put_values(&self.lats(), ..)?;

        let mut lon = file.add_variable::<f64>("lon", &["lon"])?;
        lon.put_attribute("units", "degrees_east")?;
        lon.put_values(&self.lons(), ..)?;

        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", self.time_units.as_str())?;
        time.put_values(&self.time_values, ..)?;

        // Measurement variable goes last.
        let dims = ["time", "lat", "lon"];
        let mut data = Vec::with_capacity(steps * self.first_slice.len());
        for step in 0..steps {
            data.extend(self.first_slice.iter().map(|v| v * (step as f64 + 1.0)));
        }

        match self.sample_type {
            SampleType::Float => {
                let mut var = file.add_variable::<f32>(&self.variable_name, &dims)?;
                if let Some(fill) = self.fill_value {
                    var.set_fill_value(fill)?;
                }
                put_attrs(&mut var, &self.variable_attrs)?;
                let data: Vec<f32> = data.iter().map(|v| *v as f32).collect();
                var.put_values(&data, ..)?;
            }
            SampleType::Double => {
                let mut var = file.add_variable::<f64>(&self.variable_name, &dims)?;
                if let Some(fill) = self.fill_value {
                    var.set_fill_value(f64::from(fill))?;
                }
                put_attrs(&mut var, &self.variable_attrs)?;
                var.put_values(&data, ..)?;
            }
        }

        Ok(path)
    }
}

fn put_attrs(
    var: &mut netcdf::VariableMut<'_>,
    attrs: &[(String, FixtureAttr)],
) -> Result<(), netcdf::Error> {
    for (name, value) in attrs {
        match value {
            FixtureAttr::Text(s) => var.put_attribute(name, s.as_str())?,
            FixtureAttr::Int(v) => var.put_attribute(name, *v)?,
            FixtureAttr::Double(v) => var.put_attribute(name, *v)?,
        };
    }
    Ok(())
}

/// Write a netCDF file that has global attributes but declares no variables.
pub fn write_without_variables(dir: &Path, filename: &str) -> Result<PathBuf, netcdf::Error> {
    let path = dir.join(filename);
    let mut file = netcdf::create(&path)?;
    file.add_attribute("title", "empty")?;
    Ok(path)
}

/// Write a file with the right extension that is not netCDF at all.
pub fn write_corrupt(dir: &Path, filename: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(filename);
    std::fs::write(&path, b"definitely not HDF5 or classic netCDF")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_cover_globe() {
        let fixture = InundationFile::new(filenames::FIVE_TOKEN, 10, 20);
        let lats = fixture.lats();
        let lons = fixture.lons();
        assert_eq!(lats.len(), 10);
        assert_eq!(lons.len(), 20);
        assert_eq!(lats[0], -81.0);
        assert_eq!(lons[19], 171.0);
    }

    #[test]
    fn test_cell_sets_row_major() {
        let fixture = InundationFile::new(filenames::FIVE_TOKEN, 2, 3).cell(1, 2, 7.0);
        assert_eq!(fixture.first_slice[5], 7.0);
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = InundationFile::new(filenames::SIX_TOKEN, 4, 8)
            .write_to(dir.path())
            .unwrap();
        assert!(path.exists());

        let file = netcdf::open(&path).unwrap();
        let last = file.variables().last().unwrap();
        assert_eq!(last.name(), "inun");
        assert!(last.attribute("_FillValue").is_some());
    }

    #[test]
    fn test_no_fill_value_omits_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let path = InundationFile::new(filenames::FIVE_TOKEN, 2, 2)
            .no_fill_value()
            .write_to(dir.path())
            .unwrap();

        let file = netcdf::open(&path).unwrap();
        let var = file.variable("inun").unwrap();
        assert!(var.attribute("_FillValue").is_none());
    }

    #[test]
    fn test_double_keeps_values_beyond_f32() {
        let dir = tempfile::tempdir().unwrap();
        let path = InundationFile::new(filenames::FIVE_TOKEN, 2, 2)
            .sample_type(SampleType::Double)
            .cell(0, 1, 1e300)
            .write_to(dir.path())
            .unwrap();

        let file = netcdf::open(&path).unwrap();
        let values: Vec<f64> = file.variable("inun").unwrap().get_values(..).unwrap();
        assert_eq!(values[1], 1e300);
    }
}
