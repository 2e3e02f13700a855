//! Synthetic surface fields with known, easily checked values.
//!
//! Value vectors are row-major (`row * width + col`), rows running south to
//! north to match [`alaska_coords`].

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use firewx_common::{AnalysisCycle, GridCoords, Units, VariableGrid};

/// 2 m temperature in Kelvin: 285 K on the southern row, cooling 2 K per
/// row northward and warming 1 K per column eastward.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    (0..height)
        .flat_map(|row| (0..width).map(move |col| 285.0 - 2.0 * row as f32 + col as f32))
        .collect()
}

/// Dewpoint `depression` Kelvin below each temperature.
pub fn create_dewpoint_grid(temperature: &[f32], depression: f32) -> Vec<f32> {
    temperature.iter().map(|t| t - depression).collect()
}

/// 10 m wind in m/s: calm in the first column, 2 m/s more per column.
pub fn create_wind_speed_grid(width: usize, height: usize) -> Vec<f32> {
    (0..height)
        .flat_map(|_| (0..width).map(|col| 2.0 * col as f32))
        .collect()
}

pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Regular lat/lon coordinates over south-central Alaska, with longitudes
/// in the 0-360 convention the RTMA server uses.
///
/// Rows run south to north from 58N, columns west to east from 205E
/// (-155), both at `step` degrees.
pub fn alaska_coords(width: usize, height: usize, step: f64) -> Arc<GridCoords> {
    let lats = (0..height).map(|i| 58.0 + i as f64 * step).collect();
    let lons = (0..width).map(|i| 205.0 + i as f64 * step).collect();
    Arc::new(GridCoords::new(lats, lons))
}

/// 2024-06-15 at `hour`Z.
pub fn test_cycle(hour: u32) -> AnalysisCycle {
    AnalysisCycle::hourly(
        Utc.with_ymd_and_hms(2024, 6, 15, hour, 0, 0)
            .single()
            .expect("valid test time"),
    )
}

/// Builds a [`VariableGrid`], panicking on a shape mismatch.
pub fn make_grid(
    name: &str,
    units: Units,
    cycle: AnalysisCycle,
    coords: &Arc<GridCoords>,
    values: Vec<f32>,
) -> VariableGrid {
    VariableGrid::new(name, units, cycle, coords.clone(), values).expect("test grid shape")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_layout() {
        let t = create_temperature_grid(4, 3);
        assert_eq!(t.len(), 12);
        assert_eq!(t[0], 285.0);
        assert_eq!(t[1], 286.0); // one column east
        assert_eq!(t[4], 283.0); // one row north
    }

    #[test]
    fn test_dewpoint_depression() {
        let t = create_temperature_grid(4, 4);
        let td = create_dewpoint_grid(&t, 5.0);
        assert!(t.iter().zip(&td).all(|(t, td)| (t - td - 5.0).abs() < 1e-4));
    }

    #[test]
    fn test_wind_ramp() {
        let w = create_wind_speed_grid(3, 2);
        assert_eq!(w, vec![0.0, 2.0, 4.0, 0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_alaska_coords() {
        let coords = alaska_coords(5, 3, 0.5);
        assert_eq!(coords.shape(), (3, 5));
        assert_eq!(coords.lons[0], 205.0);
        assert_eq!(coords.lats[2], 59.0);
        assert!(coords.uses_360());
    }

    #[test]
    fn test_make_grid_checks_shape() {
        let coords = alaska_coords(2, 2, 1.0);
        let grid = make_grid("tmp2m", Units::Kelvin, test_cycle(0), &coords, vec![280.0; 4]);
        assert_eq!(grid.shape(), (2, 2));
    }
}
