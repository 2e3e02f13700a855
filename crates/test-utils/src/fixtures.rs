//! Common test fixtures for firewx tests.
//!
//! Region extents, GrADS server responses and NetCDF analysis files in the
//! shape the NOMADS GrADS Data Server publishes.

/// Region extents as (west, east, south, north).
pub mod regions {
    /// Statewide Alaska extent used by the fire-weather graphics
    pub const ALASKA: (f64, f64, f64, f64) = (-170.0, -130.0, 52.0, 72.0);

    /// Kenai Peninsula / Anchorage area
    pub const SOUTH_CENTRAL: (f64, f64, f64, f64) = (-155.0, -145.0, 58.0, 63.0);

    /// Interior Alaska
    pub const INTERIOR: (f64, f64, f64, f64) = (-160.0, -141.0, 62.0, 68.0);

    /// An extent with no Alaska grid points
    pub const OUTSIDE: (f64, f64, f64, f64) = (0.0, 10.0, 0.0, 10.0);
}

/// Analysis datasets in the layout the NOMADS GrADS Data Server publishes.
pub mod dap {
    use std::path::Path;

    use chrono::{DateTime, TimeZone, Utc};

    /// GrADS fill value for missing points
    pub const FILL_VALUE: f64 = 9.999e20;

    /// Units attribute of the GrADS time axis
    pub const GRADS_TIME_UNITS: &str = "days since 1-1-1 00:00:0.0";

    /// Value of `time` on the GrADS axis (days since Julian 0001-01-01,
    /// which is Gregorian 0000-12-30) for an instant.
    pub fn grads_time_value(time: DateTime<Utc>) -> f64 {
        let epoch = Utc
            .with_ymd_and_hms(0, 12, 30, 0, 0, 0)
            .single()
            .expect("valid epoch");
        (time - epoch).num_seconds() as f64 / 86_400.0
    }

    /// Write a NetCDF file shaped like one RTMA analysis dataset.
    ///
    /// Every variable is `Float32 [time, lat, lon]` with a `_FillValue` of
    /// [`FILL_VALUE`]; `values` holds `times.len() * lats.len() * lons.len()`
    /// entries per variable.
    pub fn write_analysis_file(
        path: &Path,
        times: &[DateTime<Utc>],
        lats: &[f64],
        lons: &[f64],
        variables: &[(&str, Vec<f32>)],
    ) -> Result<(), netcdf::Error> {
        let mut file = netcdf::create(path)?;
        file.add_dimension("time", times.len())?;
        file.add_dimension("lat", lats.len())?;
        file.add_dimension("lon", lons.len())?;

        {
            let mut time = file.add_variable::<f64>("time", &["time"])?;
            time.put_attribute("units", GRADS_TIME_UNITS)?;
            let values: Vec<f64> = times.iter().map(|&t| grads_time_value(t)).collect();
            time.put_values(&values, ..)?;
        }
        {
            let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
            lat.put_attribute("units", "degrees_north")?;
            lat.put_values(lats, ..)?;
        }
        {
            let mut lon = file.add_variable::<f64>("lon", &["lon"])?;
            lon.put_attribute("units", "degrees_east")?;
            lon.put_values(lons, ..)?;
        }

        for (name, values) in variables {
            let mut var = file.add_variable::<f32>(name, &["time", "lat", "lon"])?;
            var.put_attribute("_FillValue", FILL_VALUE as f32)?;
            var.put_values(values.as_slice(), ..)?;
        }
        Ok(())
    }

    /// Body GrADS returns (with HTTP 200) for a dataset it does not have.
    pub fn grads_not_available(dataset: &str) -> String {
        format!(
            "Error {{\n    code = 0;\n    message = \"/gradsdods/{dataset} is not an available dataset\";\n}};\n"
        )
    }

    /// DDS header GrADS serves for a published dataset.
    pub fn grads_dds(dataset: &str) -> String {
        format!("Dataset {{\n  Float64 time[time = 1];\n}} {dataset};\n")
    }
}
