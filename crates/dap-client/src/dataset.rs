//! Blocking reads of `[time, lat, lon]` slices through libnetcdf.
//!
//! libnetcdf speaks DAP2 natively, so `location` may be an OPeNDAP dataset
//! URL (`https://nomads.ncep.noaa.gov/dods/akrtma/...`) or a local NetCDF
//! file holding the same variables. Only the requested slice is transferred.
//!
//! These calls block; run them on a blocking thread
//! ([`crate::DapClient::read_slice`] does).

use chrono::{DateTime, Utc};
use netcdf::{AttributeValue, File, Variable};

use crate::error::{DapError, DapResult};
use crate::time::TimeUnits;

/// One time slice of one variable, values unmodified.
#[derive(Debug, Clone)]
pub struct GridSlice {
    /// Valid time of the slice actually read
    pub valid_time: DateTime<Utc>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Row-major, `lats.len() * lons.len()` values
    pub values: Vec<f32>,
    /// `_FillValue` (or `missing_value`) declared on the variable
    pub fill_value: Option<f64>,
}

/// Read `variable` at `valid_time` from the dataset at `location`.
///
/// When the time axis has no slice at exactly `valid_time` the first slice
/// is returned; callers compare [`GridSlice::valid_time`] to detect that.
pub fn read_slice(
    location: &str,
    variable: &str,
    valid_time: DateTime<Utc>,
) -> DapResult<GridSlice> {
    let file = netcdf::open(location).map_err(|source| DapError::NetCdf {
        location: location.to_string(),
        source,
    })?;

    let var = file
        .variable(variable)
        .ok_or_else(|| DapError::missing(format!("{} is not in {}", variable, location)))?;
    let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let [time_dim, lat_dim, lon_dim] = dims.as_slice() else {
        return Err(DapError::format(format!(
            "{} has dimensions {:?}, expected [time, lat, lon]",
            variable, dims
        )));
    };

    let time_var = coordinate(&file, time_dim)?;
    let units = string_attr(&time_var, "units")
        .ok_or_else(|| DapError::missing(format!("units attribute on {}", time_dim)))?;
    let units = TimeUnits::parse(&units)?;
    let times: Vec<f64> = get_all(&time_var, location)?;
    let index = slice_index(&times, &units, valid_time)?;
    let slice_time = units.decode(times[index])?;

    let lats = get_all(&coordinate(&file, lat_dim)?, location)?;
    let lons = get_all(&coordinate(&file, lon_dim)?, location)?;

    let values: Vec<f32> = var
        .get_values((index..index + 1, .., ..))
        .map_err(|source| DapError::NetCdf {
            location: location.to_string(),
            source,
        })?;
    if values.len() != lats.len() * lons.len() {
        return Err(DapError::format(format!(
            "{} returned {} values for a {}x{} grid",
            variable,
            values.len(),
            lats.len(),
            lons.len()
        )));
    }

    let fill_value = f64_attr(&var, "_FillValue").or_else(|| f64_attr(&var, "missing_value"));

    Ok(GridSlice {
        valid_time: slice_time,
        lats,
        lons,
        values,
        fill_value,
    })
}

/// Position of `wanted` on a time axis, or 0 when no value decodes to it.
pub fn slice_index(times: &[f64], units: &TimeUnits, wanted: DateTime<Utc>) -> DapResult<usize> {
    if times.is_empty() {
        return Err(DapError::format("empty time axis"));
    }
    for (i, &value) in times.iter().enumerate() {
        if units.decode(value)? == wanted {
            return Ok(i);
        }
    }
    Ok(0)
}

fn coordinate<'f>(file: &'f File, name: &str) -> DapResult<Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| DapError::missing(format!("coordinate variable {}", name)))
}

fn get_all(var: &Variable, location: &str) -> DapResult<Vec<f64>> {
    var.get_values(..).map_err(|source| DapError::NetCdf {
        location: location.to_string(),
        source,
    })
}

/// Checking first keeps libnetcdf from logging lookups of absent attributes.
fn has_attr(var: &Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn f64_attr(var: &Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    f64::try_from(value).ok()
}

fn string_attr(var: &Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn grads_units() -> TimeUnits {
        TimeUnits::parse("days since 1-1-1 00:00:0.0").unwrap()
    }

    #[test]
    fn test_slice_index_exact_match() {
        // 2024-01-01T00Z and T12Z
        let times = [738887.0, 738887.5];
        let noon = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(slice_index(&times, &grads_units(), noon).unwrap(), 1);
    }

    #[test]
    fn test_slice_index_without_match_reads_first() {
        let times = [738887.0];
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        assert_eq!(slice_index(&times, &grads_units(), later).unwrap(), 0);
    }

    #[test]
    fn test_slice_index_empty_axis() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(slice_index(&[], &grads_units(), t).is_err());
    }
}
