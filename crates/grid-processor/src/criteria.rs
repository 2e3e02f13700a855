//! Boolean criteria masks over aligned grids.

use firewx_common::{
    CriteriaMask, FireWxError, FireWxResult, HotDryWindyThresholds, LowRelativeHumidityThreshold,
    MaskCriteria, Units, VariableGrid,
};

fn expect_units(grid: &VariableGrid, expected: Units, role: &str) -> FireWxResult<()> {
    if grid.units != expected {
        return Err(FireWxError::InvalidGrid(format!(
            "{} grid {} is in {}, expected {}",
            role,
            grid.name,
            grid.units.symbol(),
            expected.symbol()
        )));
    }
    Ok(())
}

/// Points where `T >= t && RH <= rh && W >= w`.
///
/// Temperature in °F, relative humidity in %, wind (sustained or gust) in
/// mph. All three grids must be aligned; a NaN at a point makes it false.
pub fn hot_dry_windy(
    temperature_f: &VariableGrid,
    relative_humidity: &VariableGrid,
    wind_mph: &VariableGrid,
    thresholds: &HotDryWindyThresholds,
) -> FireWxResult<CriteriaMask> {
    expect_units(temperature_f, Units::Fahrenheit, "temperature")?;
    expect_units(relative_humidity, Units::Percent, "relative humidity")?;
    expect_units(wind_mph, Units::MilesPerHour, "wind")?;
    temperature_f.ensure_aligned(relative_humidity)?;
    temperature_f.ensure_aligned(wind_mph)?;

    let values = temperature_f
        .values()
        .iter()
        .zip(relative_humidity.values())
        .zip(wind_mph.values())
        .map(|((&t, &rh), &w)| {
            t >= thresholds.temperature_f
                && rh <= thresholds.relative_humidity_pct
                && w >= thresholds.wind_mph
        })
        .collect();

    CriteriaMask::new(
        temperature_f.cycle,
        MaskCriteria::HotDryWindy(*thresholds),
        temperature_f.coords().clone(),
        values,
    )
}

/// Points where `RH <= threshold`.
pub fn low_relative_humidity(
    relative_humidity: &VariableGrid,
    threshold: &LowRelativeHumidityThreshold,
) -> FireWxResult<CriteriaMask> {
    expect_units(relative_humidity, Units::Percent, "relative humidity")?;

    let values = relative_humidity
        .values()
        .iter()
        .map(|&rh| rh <= threshold.relative_humidity_pct)
        .collect();

    CriteriaMask::new(
        relative_humidity.cycle,
        MaskCriteria::LowRelativeHumidity(*threshold),
        relative_humidity.coords().clone(),
        values,
    )
}
