//! Filename metadata parsing.
//!
//! Inundation filenames encode the experiment parameters as
//! underscore-separated tokens. The token count picks the schema:
//!
//! | tokens | fields |
//! |---|---|
//! | 5 | floodtype, climate, model, year, returnperiod |
//! | 6 | floodtype, climate, subsidence, year, returnperiod, returnperiod_decimal |
//! | 8 | the 6-token fields, then model, sea_level_rise_scenario |

use flood_common::{AttributeMap, AttributeValue};

use crate::error::{IngestionError, Result};

/// Separator between filename tokens.
pub const TOKEN_DELIMITER: char = '_';

/// The known filename layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameSchema {
    /// Riverine files.
    Five,
    /// Coastal files without a model token.
    Six,
    /// Coastal files with model and sea level rise scenario.
    Eight,
}

impl FilenameSchema {
    pub fn from_token_count(count: usize) -> Option<Self> {
        match count {
            5 => Some(Self::Five),
            6 => Some(Self::Six),
            8 => Some(Self::Eight),
            _ => None,
        }
    }

    /// Ordered field names.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Five => &["floodtype", "climate", "model", "year", "returnperiod"],
            Self::Six => &[
                "floodtype",
                "climate",
                "subsidence",
                "year",
                "returnperiod",
                "returnperiod_decimal",
            ],
            Self::Eight => &[
                "floodtype",
                "climate",
                "subsidence",
                "year",
                "returnperiod",
                "returnperiod_decimal",
                "model",
                "sea_level_rise_scenario",
            ],
        }
    }

    pub fn token_count(&self) -> usize {
        self.fields().len()
    }
}

/// Everything before the first `.` of a filename.
pub fn filename_stem(filename: &str) -> &str {
    filename.split('.').next().unwrap_or(filename)
}

/// Parse an extension-stripped filename into its field mapping.
///
/// Tokens are kept as text, so `"0002"` stays `"0002"`. Any token count
/// other than 5, 6 or 8 is an [`IngestionError::UnrecognizedSchema`].
pub fn parse_filename(stem: &str) -> Result<AttributeMap> {
    let tokens: Vec<&str> = stem.split(TOKEN_DELIMITER).collect();
    let schema = FilenameSchema::from_token_count(tokens.len()).ok_or_else(|| {
        IngestionError::UnrecognizedSchema {
            filename: stem.to_string(),
            token_count: tokens.len(),
        }
    })?;

    Ok(schema
        .fields()
        .iter()
        .zip(tokens)
        .map(|(field, token)| (*field, AttributeValue::from(token)))
        .collect())
}
