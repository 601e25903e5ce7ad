//! The numeric boundary between externally owned records and the scoring math.
//!
//! Records carry positions and metrics as decimal strings. Every string is parsed here, once,
//! into either a finite `f64` or a [`FieldError`] naming the offending field, so that no NaN can
//! reach the normalization curves.

use dispatch_selection::geo::GeoPoint;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("{field} is missing")]
    Missing { field: &'static str },
    #[error("{field} is not a number: {value:?}")]
    Unparseable { field: &'static str, value: String },
    #[error("{field} is not finite")]
    NonFinite { field: &'static str },
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Unparseable { field, .. }
            | Self::NonFinite { field }
            | Self::OutOfRange { field, .. } => field,
        }
    }
}

/// How malformed metric strings are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetricPolicy {
    /// Score a malformed metric as 0, logging a warning. Matches how legacy records were scored.
    #[default]
    DefaultToZero,
    /// Treat a malformed metric as disqualifying.
    Strict,
}

/// Parse a decimal string into a finite value.
pub fn parse_decimal(field: &'static str, value: &str) -> Result<f64, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Missing { field });
    }
    let parsed: f64 = trimmed.parse().map_err(|_| FieldError::Unparseable {
        field,
        value: value.to_owned(),
    })?;
    if !parsed.is_finite() {
        return Err(FieldError::NonFinite { field });
    }
    Ok(parsed)
}

/// Parse an optional metric. An absent or blank metric is 0, as records default it.
pub fn parse_metric(field: &'static str, value: Option<&str>) -> Result<f64, FieldError> {
    match value.map(str::trim) {
        None | Some("") => Ok(0.0),
        Some(value) => parse_decimal(field, value),
    }
}

/// Check a metric that already arrives as a number.
pub fn check_metric(field: &'static str, value: Option<f64>) -> Result<f64, FieldError> {
    match value {
        None => Ok(0.0),
        Some(value) if value.is_finite() => Ok(value),
        Some(_) => Err(FieldError::NonFinite { field }),
    }
}

/// Parse a latitude/longitude pair. Both must be present, finite and within range.
pub fn parse_location(
    latitude: (&'static str, Option<&str>),
    longitude: (&'static str, Option<&str>),
) -> Result<GeoPoint, FieldError> {
    let (lat_field, lat) = latitude;
    let (lon_field, lon) = longitude;
    let lat = parse_decimal(lat_field, lat.ok_or(FieldError::Missing { field: lat_field })?)?;
    let lon = parse_decimal(lon_field, lon.ok_or(FieldError::Missing { field: lon_field })?)?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(FieldError::OutOfRange {
            field: lat_field,
            value: lat,
        });
    }
    GeoPoint::new(lat, lon).ok_or(FieldError::OutOfRange {
        field: lon_field,
        value: lon,
    })
}
