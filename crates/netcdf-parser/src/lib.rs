//! NetCDF reader for flood inundation model output.
//!
//! Two entry points cover what the conversion pipeline needs from a source
//! file:
//!
//! - [`MetadataExtractor`] collects the file-level (global) attributes and the
//!   attributes of the measurement variable.
//! - [`read_first_slice`] reads the coordinate axes, the raw time axis with its
//!   units string, and the first time slice of the measurement variable.
//!
//! # Measurement variable convention
//!
//! Inundation files declare their coordinate variables (`time`, `lat`, `lon`)
//! first and the measurement variable last. [`VariableSelection::LastDeclared`]
//! encodes that convention; [`VariableSelection::Named`] is available for
//! inputs that carry an explicit variable name.
//!
//! Every function opens the file itself and drops the handle before
//! returning, so no descriptor outlives a call.

mod attributes;
pub mod error;
mod reader;

pub use attributes::{convert_attribute, ExtractedMetadata, MetadataExtractor, VariableSelection};
pub use error::{NetCdfError, NetCdfResult};
pub use reader::{read_first_slice, CoordinateAxes, FirstSlice, TimeAxis};

/// Name of the latitude coordinate variable.
pub const LAT_VARIABLE: &str = "lat";
/// Name of the longitude coordinate variable.
pub const LON_VARIABLE: &str = "lon";
/// Name of the time coordinate variable.
pub const TIME_VARIABLE: &str = "time";
