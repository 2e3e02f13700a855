//! Unit conversions for raw analysis grids.
//!
//! Each conversion checks the grid is in the units it converts from, so a
//! grid cannot be converted twice by accident. Shape, coordinates and cycle
//! are preserved; missing values stay NaN.

use firewx_common::{FireWxError, FireWxResult, Units, VariableGrid};

/// Miles per hour in one metre per second.
pub const MS_TO_MPH: f32 = 2.23694;

/// Metres in one statute mile.
pub const METERS_PER_STATUTE_MILE: f32 = 1609.344;

const KELVIN_OFFSET: f32 = 273.15;

fn expect_units(grid: &VariableGrid, expected: Units) -> FireWxResult<()> {
    if grid.units != expected {
        return Err(FireWxError::InvalidGrid(format!(
            "{} is in {}, expected {}",
            grid.name,
            grid.units.symbol(),
            expected.symbol()
        )));
    }
    Ok(())
}

/// `F = (K - 273.15) * 9/5 + 32`
pub fn kelvin_to_fahrenheit(grid: &VariableGrid) -> FireWxResult<VariableGrid> {
    expect_units(grid, Units::Kelvin)?;
    Ok(grid.map(grid.name.clone(), Units::Fahrenheit, |k| {
        (k - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0
    }))
}

pub fn kelvin_to_celsius(grid: &VariableGrid) -> FireWxResult<VariableGrid> {
    expect_units(grid, Units::Kelvin)?;
    Ok(grid.map(grid.name.clone(), Units::Celsius, |k| k - KELVIN_OFFSET))
}

pub fn ms_to_mph(grid: &VariableGrid) -> FireWxResult<VariableGrid> {
    expect_units(grid, Units::MetersPerSecond)?;
    Ok(grid.map(grid.name.clone(), Units::MilesPerHour, |v| v * MS_TO_MPH))
}

pub fn pascals_to_hectopascals(grid: &VariableGrid) -> FireWxResult<VariableGrid> {
    expect_units(grid, Units::Pascal)?;
    Ok(grid.map(grid.name.clone(), Units::Hectopascal, |p| p / 100.0))
}

/// Visibility and ceiling in statute miles.
pub fn meters_to_statute_miles(grid: &VariableGrid) -> FireWxResult<VariableGrid> {
    expect_units(grid, Units::Meters)?;
    Ok(grid.map(grid.name.clone(), Units::StatuteMiles, |m| {
        m / METERS_PER_STATUTE_MILE
    }))
}

/// Convert to `target` with whichever conversion applies.
pub fn convert(grid: &VariableGrid, target: Units) -> FireWxResult<VariableGrid> {
    match (grid.units, target) {
        (Units::Kelvin, Units::Fahrenheit) => kelvin_to_fahrenheit(grid),
        (Units::Kelvin, Units::Celsius) => kelvin_to_celsius(grid),
        (Units::MetersPerSecond, Units::MilesPerHour) => ms_to_mph(grid),
        (Units::Pascal, Units::Hectopascal) => pascals_to_hectopascals(grid),
        (Units::Meters, Units::StatuteMiles) => meters_to_statute_miles(grid),
        (from, to) => Err(FireWxError::InvalidGrid(format!(
            "no conversion from {} to {} for {}",
            from.symbol(),
            to.symbol(),
            grid.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use firewx_common::{AnalysisCycle, GridCoords};

    fn grid(units: Units, values: Vec<f32>) -> VariableGrid {
        let n = values.len();
        let lons = (0..n).map(|i| 200.0 + i as f64).collect();
        let coords = Arc::new(GridCoords::new(vec![60.0], lons));
        let cycle = AnalysisCycle::hourly(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap());
        VariableGrid::new("x", units, cycle, coords, values).unwrap()
    }

    #[test]
    fn test_kelvin_to_fahrenheit_fixed_points() {
        let f = kelvin_to_fahrenheit(&grid(Units::Kelvin, vec![273.15, 373.15])).unwrap();
        assert!((f.values()[0] - 32.0).abs() < 1e-3);
        assert!((f.values()[1] - 212.0).abs() < 1e-3);
        assert_eq!(f.units, Units::Fahrenheit);
    }

    #[test]
    fn test_ms_to_mph() {
        let mph = ms_to_mph(&grid(Units::MetersPerSecond, vec![1.0, 0.0])).unwrap();
        assert!((mph.values()[0] - 2.23694).abs() < 1e-6);
        assert_eq!(mph.values()[1], 0.0);
    }

    #[test]
    fn test_double_conversion_is_rejected() {
        let f = kelvin_to_fahrenheit(&grid(Units::Kelvin, vec![300.0])).unwrap();
        assert!(matches!(kelvin_to_fahrenheit(&f), Err(FireWxError::InvalidGrid(_))));
        let mph = ms_to_mph(&grid(Units::MetersPerSecond, vec![3.0])).unwrap();
        assert!(ms_to_mph(&mph).is_err());
    }

    #[test]
    fn test_nan_and_shape_preserved() {
        let src = grid(Units::Kelvin, vec![f32::NAN, 280.0, 290.0]);
        let c = kelvin_to_celsius(&src).unwrap();
        assert!(c.values()[0].is_nan());
        assert_eq!(c.shape(), src.shape());
        assert!(Arc::ptr_eq(c.coords(), src.coords()));
    }

    #[test]
    fn test_supplementary_conversions() {
        let hpa = pascals_to_hectopascals(&grid(Units::Pascal, vec![101_325.0])).unwrap();
        assert!((hpa.values()[0] - 1013.25).abs() < 1e-2);

        let mi = meters_to_statute_miles(&grid(Units::Meters, vec![16_093.44])).unwrap();
        assert!((mi.values()[0] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_convert_dispatch() {
        let g = grid(Units::MetersPerSecond, vec![10.0]);
        assert_eq!(convert(&g, Units::MilesPerHour).unwrap().units, Units::MilesPerHour);
        assert!(convert(&g, Units::Fahrenheit).is_err());
    }
}
