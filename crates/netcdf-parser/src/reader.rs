//! Coordinate axes, time axis and first-slice reading.

use std::path::Path;

use flood_common::Grid2D;
use tracing::debug;

use crate::attributes::VariableSelection;
use crate::error::{NetCdfError, NetCdfResult};
use crate::{LAT_VARIABLE, LON_VARIABLE, TIME_VARIABLE};

/// Raw time axis: offsets plus the units string they are expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub units: String,
    pub values: Vec<f64>,
}

/// Latitude and longitude coordinate values as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateAxes {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
}

/// Everything the converter reads out of a source file besides attributes.
#[derive(Debug, Clone)]
pub struct FirstSlice {
    /// Name of the measurement variable the slice came from.
    pub variable_name: String,
    pub axes: CoordinateAxes,
    pub time: TimeAxis,
    /// Time index 0 of the measurement variable, in file row order.
    ///
    /// Read as `f64` whatever the stored type, so no value is rounded or
    /// rejected before range checks.
    pub grid: Grid2D<f64>,
}

/// Read the axes, time axis and the first time slice of the measurement
/// variable.
///
/// The measurement variable must be three-dimensional, `(time, y, x)`. Only
/// time index 0 is read; later steps are ignored.
pub fn read_first_slice(path: &Path, selection: &VariableSelection) -> NetCdfResult<FirstSlice> {
    let file = netcdf::open(path).map_err(|e| NetCdfError::open(path, e))?;

    let lats = read_axis(&file, LAT_VARIABLE)?;
    let lons = read_axis(&file, LON_VARIABLE)?;

    let time_var = file
        .variable(TIME_VARIABLE)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", TIME_VARIABLE)))?;
    let units = read_units(&time_var)?;
    let time_values: Vec<f64> = time_var.get_values(..)?;

    let var = selection.select(&file)?;
    let variable_name = var.name();
    let dims = var.dimensions();
    if dims.len() != 3 {
        return Err(NetCdfError::InvalidFormat(format!(
            "variable '{}' has {} dimensions, expected (time, y, x)",
            variable_name,
            dims.len()
        )));
    }

    let steps = dims[0].len();
    let rows = dims[1].len();
    let cols = dims[2].len();
    if steps == 0 {
        return Err(NetCdfError::MissingData(format!(
            "variable '{}' has no time steps",
            variable_name
        )));
    }

    let start: [usize; 3] = [0, 0, 0];
    let count: [usize; 3] = [1, rows, cols];
    let data: Vec<f64> = var.get_values((&start, &count))?;
    let grid = Grid2D::new(rows, cols, data)
        .map_err(|e| NetCdfError::InvalidFormat(format!("variable '{}': {}", variable_name, e)))?;

    debug!(
        path = %path.display(),
        variable = %variable_name,
        steps,
        rows,
        cols,
        "Read first time slice"
    );

    Ok(FirstSlice {
        variable_name,
        axes: CoordinateAxes { lats, lons },
        time: TimeAxis {
            units,
            values: time_values,
        },
        grid,
    })
}

fn read_axis(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;
    Ok(var.get_values(..)?)
}

fn read_units(var: &netcdf::Variable) -> NetCdfResult<String> {
    let value = var
        .attribute_value("units")
        .ok_or_else(|| NetCdfError::MissingData(format!("units attribute on '{}'", var.name())))??;

    match value {
        netcdf::AttributeValue::Str(s) => Ok(s),
        other => Err(NetCdfError::InvalidFormat(format!(
            "units attribute on '{}' is not text: {:?}",
            var.name(),
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{filenames, index_grid, InundationFile, SampleType};

    #[test]
    fn test_reads_first_step_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = InundationFile::new(filenames::FIVE_TOKEN, 3, 4)
            .first_slice(index_grid(3, 4))
            .time_values(&[0.0, 1.0])
            .write_to(dir.path())
            .unwrap();

        let slice = read_first_slice(&path, &VariableSelection::LastDeclared).unwrap();
        assert_eq!(slice.variable_name, "inun");
        assert_eq!(slice.grid.shape(), (3, 4));
        assert_eq!(slice.grid.get(2, 3), Some(2003.0));
        assert_eq!(slice.axes.lats.len(), 3);
        assert_eq!(slice.axes.lons.len(), 4);
        assert_eq!(slice.time.units, "Days since 1960-01-01");
        assert_eq!(slice.time.values, vec![0.0, 1.0]);
    }

    #[test]
    fn test_double_values_read_unrounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = InundationFile::new(filenames::FIVE_TOKEN, 2, 2)
            .sample_type(SampleType::Double)
            .cell(0, 0, 1.0000000003e19)
            .cell(1, 1, 1e300)
            .write_to(dir.path())
            .unwrap();

        let slice = read_first_slice(&path, &VariableSelection::default()).unwrap();
        assert_eq!(slice.grid.get(0, 0), Some(1.0000000003e19));
        assert_eq!(slice.grid.get(1, 1), Some(1e300));
    }

    #[test]
    fn test_missing_named_variable_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = InundationFile::new(filenames::FIVE_TOKEN, 2, 2)
            .write_to(dir.path())
            .unwrap();

        let selection = VariableSelection::Named("depth".to_string());
        assert!(read_first_slice(&path, &selection).is_err());
    }
}
