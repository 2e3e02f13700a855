//! Variable vocabulary of the surface analysis and the physical units used
//! by raw and derived grids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FireWxError;

/// Physical units carried by a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    Kelvin,
    Celsius,
    Fahrenheit,
    MetersPerSecond,
    MilesPerHour,
    Pascal,
    Hectopascal,
    Meters,
    StatuteMiles,
    GeopotentialMeters,
    KilogramsPerKilogram,
    Percent,
    Degrees,
}

impl Units {
    /// Abbreviation used in legends and logs.
    pub fn symbol(&self) -> &'static str {
        match self {
            Units::Kelvin => "K",
            Units::Celsius => "°C",
            Units::Fahrenheit => "°F",
            Units::MetersPerSecond => "m/s",
            Units::MilesPerHour => "mph",
            Units::Pascal => "Pa",
            Units::Hectopascal => "hPa",
            Units::Meters => "m",
            Units::StatuteMiles => "mi",
            Units::GeopotentialMeters => "gpm",
            Units::KilogramsPerKilogram => "kg/kg",
            Units::Percent => "%",
            Units::Degrees => "°",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The fixed set of variables published by the Alaska RTMA on NOMADS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableName {
    /// Cloud ceiling height
    Ceilceil,
    /// 2 m dewpoint temperature
    Dpt2m,
    /// 10 m wind gust
    Gust10m,
    /// Surface geopotential height
    Hgtsfc,
    /// Surface pressure
    Pressfc,
    /// 2 m specific humidity
    Spfh2m,
    /// Total cloud cover (entire atmosphere)
    Tcdcclm,
    /// 2 m temperature
    Tmp2m,
    /// 10 m U wind component
    Ugrd10m,
    /// 10 m V wind component
    Vgrd10m,
    /// Surface visibility
    Vissfc,
    /// 10 m wind direction
    Wdir10m,
    /// 10 m wind speed
    Wind10m,
}

impl VariableName {
    pub const ALL: [VariableName; 13] = [
        VariableName::Ceilceil,
        VariableName::Dpt2m,
        VariableName::Gust10m,
        VariableName::Hgtsfc,
        VariableName::Pressfc,
        VariableName::Spfh2m,
        VariableName::Tcdcclm,
        VariableName::Tmp2m,
        VariableName::Ugrd10m,
        VariableName::Vgrd10m,
        VariableName::Vissfc,
        VariableName::Wdir10m,
        VariableName::Wind10m,
    ];

    /// Name as it appears in the dataset.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableName::Ceilceil => "ceilceil",
            VariableName::Dpt2m => "dpt2m",
            VariableName::Gust10m => "gust10m",
            VariableName::Hgtsfc => "hgtsfc",
            VariableName::Pressfc => "pressfc",
            VariableName::Spfh2m => "spfh2m",
            VariableName::Tcdcclm => "tcdcclm",
            VariableName::Tmp2m => "tmp2m",
            VariableName::Ugrd10m => "ugrd10m",
            VariableName::Vgrd10m => "vgrd10m",
            VariableName::Vissfc => "vissfc",
            VariableName::Wdir10m => "wdir10m",
            VariableName::Wind10m => "wind10m",
        }
    }

    /// Units of the raw values as received from the source.
    pub fn native_units(&self) -> Units {
        match self {
            VariableName::Ceilceil | VariableName::Vissfc => Units::Meters,
            VariableName::Dpt2m | VariableName::Tmp2m => Units::Kelvin,
            VariableName::Gust10m
            | VariableName::Ugrd10m
            | VariableName::Vgrd10m
            | VariableName::Wind10m => Units::MetersPerSecond,
            VariableName::Hgtsfc => Units::GeopotentialMeters,
            VariableName::Pressfc => Units::Pascal,
            VariableName::Spfh2m => Units::KilogramsPerKilogram,
            VariableName::Tcdcclm => Units::Percent,
            VariableName::Wdir10m => Units::Degrees,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            VariableName::Ceilceil => "Cloud ceiling",
            VariableName::Dpt2m => "2 m dewpoint temperature",
            VariableName::Gust10m => "10 m wind gust",
            VariableName::Hgtsfc => "Surface geopotential height",
            VariableName::Pressfc => "Surface pressure",
            VariableName::Spfh2m => "2 m specific humidity",
            VariableName::Tcdcclm => "Total cloud cover",
            VariableName::Tmp2m => "2 m temperature",
            VariableName::Ugrd10m => "10 m U wind component",
            VariableName::Vgrd10m => "10 m V wind component",
            VariableName::Vissfc => "Surface visibility",
            VariableName::Wdir10m => "10 m wind direction",
            VariableName::Wind10m => "10 m wind speed",
        }
    }
}

impl FromStr for VariableName {
    type Err = FireWxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        VariableName::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == needle)
            .ok_or_else(|| FireWxError::UnknownVariable(s.to_string()))
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_round_trips_through_names() {
        for v in VariableName::ALL {
            assert_eq!(v.as_str().parse::<VariableName>().unwrap(), v);
        }
    }

    #[test]
    fn test_unknown_variable() {
        let err = "rh2m".parse::<VariableName>().unwrap_err();
        assert!(matches!(err, FireWxError::UnknownVariable(name) if name == "rh2m"));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("TMP2M".parse::<VariableName>().unwrap(), VariableName::Tmp2m);
    }

    #[test]
    fn test_native_units() {
        assert_eq!(VariableName::Tmp2m.native_units(), Units::Kelvin);
        assert_eq!(VariableName::Gust10m.native_units(), Units::MetersPerSecond);
        assert_eq!(VariableName::Pressfc.native_units(), Units::Pascal);
    }
}
