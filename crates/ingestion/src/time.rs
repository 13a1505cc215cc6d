//! Time axis normalization.
//!
//! Source files store time as day offsets from one of a few reference
//! epochs. Units strings are matched exactly; there is no general CF units
//! parser here.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{IngestionError, Result};

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Reference epochs known to appear in inundation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEpoch {
    Y1900,
    Y1901,
    Y1960,
}

impl TimeEpoch {
    /// Match a units string against the recognized set.
    pub fn from_units(units: &str) -> Option<Self> {
        match units {
            "days since 1900-01-01 00:00:00" | "Days since 1900-01-01" => Some(Self::Y1900),
            "days since 1901-01-01 00:00:00" | "Days since 1901-01-01" => Some(Self::Y1901),
            "Days since 1960-01-01 00:00:00" | "Days since 1960-01-01" => Some(Self::Y1960),
            _ => None,
        }
    }

    pub fn year(&self) -> i32 {
        match self {
            Self::Y1900 => 1900,
            Self::Y1901 => 1901,
            Self::Y1960 => 1960,
        }
    }

    /// Midnight on January 1st of the epoch year.
    pub fn start(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.year(), 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }
}

/// Convert day offsets into timestamps.
///
/// Fractional days are kept to microsecond precision. An unrecognized units
/// string fails the whole axis; no placeholder timestamps are produced.
pub fn normalize_time(units: &str, offsets: &[f64]) -> Result<Vec<NaiveDateTime>> {
    let epoch = TimeEpoch::from_units(units)
        .ok_or_else(|| IngestionError::UnrecognizedTimeUnits(units.to_string()))?;
    let start = epoch.start();

    offsets
        .iter()
        .map(|&offset| {
            let invalid = || IngestionError::InvalidTimeOffset {
                units: units.to_string(),
                offset,
            };
            let micros = (offset * MICROS_PER_DAY).round();
            if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
                return Err(invalid());
            }
            start
                .checked_add_signed(Duration::microseconds(micros as i64))
                .ok_or_else(invalid)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_1960_short_form() {
        let times = normalize_time("Days since 1960-01-01", &[0.0]).unwrap();
        assert_eq!(times, vec![ymd(1960, 1, 1)]);
    }

    #[test]
    fn test_1900_long_form() {
        let times = normalize_time("days since 1900-01-01 00:00:00", &[1.0]).unwrap();
        assert_eq!(times, vec![ymd(1900, 1, 2)]);
    }

    #[test]
    fn test_all_recognized_units() {
        let cases = [
            ("days since 1900-01-01 00:00:00", 1900),
            ("Days since 1900-01-01", 1900),
            ("days since 1901-01-01 00:00:00", 1901),
            ("Days since 1901-01-01", 1901),
            ("Days since 1960-01-01 00:00:00", 1960),
            ("Days since 1960-01-01", 1960),
        ];
        for (units, year) in cases {
            let times = normalize_time(units, &[31.0]).unwrap();
            assert_eq!(times, vec![ymd(year, 2, 1)], "units: {}", units);
        }
    }

    #[test]
    fn test_fractional_days() {
        let times = normalize_time("Days since 1901-01-01", &[0.5]).unwrap();
        assert_eq!(
            times[0],
            NaiveDate::from_ymd_opt(1901, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_multiple_offsets_keep_order() {
        let times = normalize_time("Days since 1960-01-01", &[365.0, 0.0]).unwrap();
        assert_eq!(times, vec![ymd(1960, 12, 31), ymd(1960, 1, 1)]);
    }

    #[test]
    fn test_unrecognized_units() {
        for units in ["hours since 1960-01-01", "days since 1960-01-01", "", "Days since 1900-01-01 "] {
            assert!(matches!(
                normalize_time(units, &[0.0]),
                Err(IngestionError::UnrecognizedTimeUnits(_))
            ));
        }
    }

    #[test]
    fn test_unrecognized_units_with_empty_axis() {
        assert!(normalize_time("seconds since 1970-01-01", &[]).is_err());
    }

    #[test]
    fn test_non_finite_offset() {
        assert!(matches!(
            normalize_time("Days since 1960-01-01", &[f64::NAN]),
            Err(IngestionError::InvalidTimeOffset { .. })
        ));
        assert!(normalize_time("Days since 1960-01-01", &[1e300]).is_err());
    }
}
