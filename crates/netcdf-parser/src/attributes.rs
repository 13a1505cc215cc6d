//! Global and variable-level attribute extraction.

use std::path::Path;

use flood_common::{AttributeMap, AttributeValue};
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};

/// How the measurement variable is picked out of a file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VariableSelection {
    /// The last variable declared in the file.
    #[default]
    LastDeclared,
    /// A variable with this exact name.
    Named(String),
}

impl VariableSelection {
    /// Resolve the selection against an open file.
    pub(crate) fn select<'f>(&self, file: &'f netcdf::File) -> NetCdfResult<netcdf::Variable<'f>> {
        match self {
            VariableSelection::LastDeclared => file
                .variables()
                .last()
                .ok_or_else(|| NetCdfError::MissingData("file declares no variables".to_string())),
            VariableSelection::Named(name) => file
                .variable(name)
                .ok_or_else(|| NetCdfError::MissingData(format!("variable '{}'", name))),
        }
    }
}

/// Attributes read from one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedMetadata {
    /// Name of the measurement variable the variable attributes came from.
    pub variable_name: String,
    /// File-level attributes, keyed by attribute name.
    pub global: AttributeMap,
    /// Measurement-variable attributes, keyed `{variable}_{attribute}`.
    pub variable: AttributeMap,
}

/// Reads global and measurement-variable attributes from netCDF files.
#[derive(Debug, Clone, Default)]
pub struct MetadataExtractor {
    selection: VariableSelection,
}

impl MetadataExtractor {
    pub fn new(selection: VariableSelection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> &VariableSelection {
        &self.selection
    }

    /// Open `path` read-only and collect its attributes.
    ///
    /// Fails if the file cannot be opened or the measurement variable cannot
    /// be resolved (including a file with no variables at all).
    pub fn extract(&self, path: &Path) -> NetCdfResult<ExtractedMetadata> {
        let file = netcdf::open(path).map_err(|e| NetCdfError::open(path, e))?;

        let mut global = AttributeMap::new();
        for attr in file.attributes() {
            let value = attr.value()?;
            global.insert(attr.name(), convert_attribute(value));
        }

        let var = self.selection.select(&file)?;
        let variable_name = var.name();

        let mut variable = AttributeMap::new();
        for attr in var.attributes() {
            let value = attr.value()?;
            variable.insert(
                format!("{}_{}", variable_name, attr.name()),
                convert_attribute(value),
            );
        }

        debug!(
            path = %path.display(),
            variable = %variable_name,
            global_count = global.len(),
            variable_count = variable.len(),
            "Extracted netCDF attributes"
        );

        Ok(ExtractedMetadata {
            variable_name,
            global,
            variable,
        })
    }
}

/// Convert a raw netCDF attribute into the pipeline's tagged value.
///
/// Scalars keep their kind (integer, float, text); arrays become lists.
/// Unsigned 64-bit values that do not fit in `i64` are stored as floats.
pub fn convert_attribute(value: netcdf::AttributeValue) -> AttributeValue {
    use netcdf::AttributeValue as Nc;

    fn ints<T: Into<i64>>(items: Vec<T>) -> AttributeValue {
        AttributeValue::IntList(items.into_iter().map(Into::into).collect())
    }

    fn u64_value(v: u64) -> AttributeValue {
        i64::try_from(v)
            .map(AttributeValue::Int)
            .unwrap_or(AttributeValue::Float(v as f64))
    }

    match value {
        Nc::Uchar(v) => AttributeValue::Int(v.into()),
        Nc::Uchars(v) => ints(v),
        Nc::Schar(v) => AttributeValue::Int(v.into()),
        Nc::Schars(v) => ints(v),
        Nc::Ushort(v) => AttributeValue::Int(v.into()),
        Nc::Ushorts(v) => ints(v),
        Nc::Short(v) => AttributeValue::Int(v.into()),
        Nc::Shorts(v) => ints(v),
        Nc::Uint(v) => AttributeValue::Int(v.into()),
        Nc::Uints(v) => ints(v),
        Nc::Int(v) => AttributeValue::Int(v.into()),
        Nc::Ints(v) => ints(v),
        Nc::Ulonglong(v) => u64_value(v),
        Nc::Ulonglongs(v) => {
            if v.iter().all(|x| i64::try_from(*x).is_ok()) {
                AttributeValue::IntList(v.into_iter().map(|x| x as i64).collect())
            } else {
                AttributeValue::FloatList(v.into_iter().map(|x| x as f64).collect())
            }
        }
        Nc::Longlong(v) => AttributeValue::Int(v),
        Nc::Longlongs(v) => AttributeValue::IntList(v),
        Nc::Float(v) => AttributeValue::Float(v.into()),
        Nc::Floats(v) => AttributeValue::FloatList(v.into_iter().map(f64::from).collect()),
        Nc::Double(v) => AttributeValue::Float(v),
        Nc::Doubles(v) => AttributeValue::FloatList(v),
        Nc::Str(v) => AttributeValue::Text(v),
        Nc::Strs(v) => AttributeValue::TextList(v),
        #[allow(unreachable_patterns)]
        other => AttributeValue::Text(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcdf::AttributeValue as Nc;

    #[test]
    fn test_convert_scalars() {
        assert_eq!(convert_attribute(Nc::Short(-3)), AttributeValue::Int(-3));
        assert_eq!(convert_attribute(Nc::Double(0.25)), AttributeValue::Float(0.25));
        assert_eq!(convert_attribute(Nc::Float(1.5)), AttributeValue::Float(1.5));
        assert_eq!(
            convert_attribute(Nc::Str("CF-1.6".to_string())),
            AttributeValue::Text("CF-1.6".to_string())
        );
    }

    #[test]
    fn test_convert_arrays() {
        assert_eq!(
            convert_attribute(Nc::Ints(vec![1, 2])),
            AttributeValue::IntList(vec![1, 2])
        );
        assert_eq!(
            convert_attribute(Nc::Floats(vec![0.5, 1.0])),
            AttributeValue::FloatList(vec![0.5, 1.0])
        );
    }

    #[test]
    fn test_convert_large_unsigned() {
        assert_eq!(convert_attribute(Nc::Ulonglong(7)), AttributeValue::Int(7));
        assert_eq!(
            convert_attribute(Nc::Ulonglong(u64::MAX)),
            AttributeValue::Float(u64::MAX as f64)
        );
    }
}
