//! Derived fields: relative humidity and 24-hour differences.
//!
//! All functions are pure. Inputs are checked for alignment before any
//! arithmetic, and missing values (NaN) propagate to the output.

use firewx_common::{
    DerivationKind, DerivedGrid, FireWxError, FireWxResult, Units, VariableGrid,
};
use rayon::prelude::*;

use crate::units::kelvin_to_celsius;

/// Name given to relative humidity grids.
pub const RELATIVE_HUMIDITY: &str = "rh2m";

// Magnus coefficients over water (Alduchov & Eskridge 1996)
const MAGNUS_A: f64 = 6.1094;
const MAGNUS_B: f64 = 17.625;
const MAGNUS_C: f64 = 243.04;

/// Saturation vapour pressure (hPa) at `t_c` degrees Celsius.
pub fn saturation_vapor_pressure(t_c: f64) -> f64 {
    MAGNUS_A * (MAGNUS_B * t_c / (t_c + MAGNUS_C)).exp()
}

/// Relative humidity (%) from temperature and dewpoint in Celsius,
/// clipped to [0, 100].
pub fn relative_humidity_point(t_c: f32, td_c: f32) -> f32 {
    let rh = 100.0 * saturation_vapor_pressure(td_c as f64) / saturation_vapor_pressure(t_c as f64);
    (rh as f32).clamp(0.0, 100.0)
}

/// Relative humidity grid from 2 m temperature and dewpoint in Kelvin.
///
/// Both grids must share coordinates and cycle.
pub fn relative_humidity(
    temperature: &VariableGrid,
    dewpoint: &VariableGrid,
) -> FireWxResult<DerivedGrid> {
    temperature.ensure_aligned(dewpoint)?;
    let t_c = kelvin_to_celsius(temperature)?;
    let td_c = kelvin_to_celsius(dewpoint)?;

    let values: Vec<f32> = t_c
        .values()
        .par_iter()
        .zip(td_c.values().par_iter())
        .map(|(&t, &td)| relative_humidity_point(t, td))
        .collect();

    let grid = temperature.with_values(RELATIVE_HUMIDITY, Units::Percent, values)?;
    Ok(DerivedGrid::single(grid, DerivationKind::RelativeHumidity))
}

/// Elementwise `now - ago`.
///
/// Grids must share coordinates and units; the cycles may differ by any
/// amount and both are recorded on the result.
pub fn delta_24h(now: &VariableGrid, ago: &VariableGrid) -> FireWxResult<DerivedGrid> {
    now.ensure_same_coords(ago)?;
    if now.units != ago.units {
        return Err(FireWxError::GridAlignment(format!(
            "{} is in {} but {} is in {}",
            now.name,
            now.units.symbol(),
            ago.name,
            ago.units.symbol()
        )));
    }

    let values: Vec<f32> = now
        .values()
        .par_iter()
        .zip(ago.values().par_iter())
        .map(|(&a, &b)| a - b)
        .collect();

    let grid = now.with_values(format!("{}_24h_change", now.name), now.units, values)?;
    Ok(DerivedGrid {
        grid,
        kind: DerivationKind::Delta24h,
        valid_now: now.cycle,
        valid_24h_ago: Some(ago.cycle),
    })
}

/// 24-hour change of relative humidity (percentage points).
pub fn relative_humidity_24h_change(
    temperature_now: &VariableGrid,
    dewpoint_now: &VariableGrid,
    temperature_ago: &VariableGrid,
    dewpoint_ago: &VariableGrid,
) -> FireWxResult<DerivedGrid> {
    let rh_now = relative_humidity(temperature_now, dewpoint_now)?;
    let rh_ago = relative_humidity(temperature_ago, dewpoint_ago)?;
    delta_24h(&rh_now.grid, &rh_ago.grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturation_at_freezing() {
        assert!((saturation_vapor_pressure(0.0) - MAGNUS_A).abs() < 1e-9);
    }

    #[test]
    fn test_point_rh_bounds() {
        assert_eq!(relative_humidity_point(20.0, 20.0), 100.0);
        // supersaturated input is clipped
        assert_eq!(relative_humidity_point(10.0, 12.0), 100.0);
        let rh = relative_humidity_point(30.0, 10.0);
        assert!(rh > 0.0 && rh < 100.0);
        assert!(relative_humidity_point(f32::NAN, 10.0).is_nan());
    }

    #[test]
    fn test_known_value() {
        // 25 C air with a 10 C dewpoint is about 38.5 %
        let rh = relative_humidity_point(25.0, 10.0);
        assert!((rh - 38.5).abs() < 0.5, "rh = {}", rh);
    }
}
