//! Named fire-weather products requested by the plotting layer.

use std::fmt;
use std::str::FromStr;

use firewx_common::FireWxError;
use serde::{Deserialize, Serialize};

/// Which wind field a hot/dry/windy mask uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindField {
    Sustained,
    Gust,
}

/// A product the core can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Temperature,
    Dewpoint,
    RelativeHumidity,
    WindSpeed,
    WindGust,
    Temperature24hChange,
    RelativeHumidity24hChange,
    WindSpeed24hChange,
    LowRelativeHumidity,
    HotDryWindy { wind: WindField },
}

impl Product {
    pub const ALL: [Product; 11] = [
        Product::Temperature,
        Product::Dewpoint,
        Product::RelativeHumidity,
        Product::WindSpeed,
        Product::WindGust,
        Product::Temperature24hChange,
        Product::RelativeHumidity24hChange,
        Product::WindSpeed24hChange,
        Product::LowRelativeHumidity,
        Product::HotDryWindy {
            wind: WindField::Sustained,
        },
        Product::HotDryWindy {
            wind: WindField::Gust,
        },
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Product::Temperature => "temperature",
            Product::Dewpoint => "dewpoint",
            Product::RelativeHumidity => "relative-humidity",
            Product::WindSpeed => "wind-speed",
            Product::WindGust => "wind-gust",
            Product::Temperature24hChange => "temperature-24h-change",
            Product::RelativeHumidity24hChange => "relative-humidity-24h-change",
            Product::WindSpeed24hChange => "wind-speed-24h-change",
            Product::LowRelativeHumidity => "low-relative-humidity",
            Product::HotDryWindy {
                wind: WindField::Sustained,
            } => "hot-dry-windy",
            Product::HotDryWindy {
                wind: WindField::Gust,
            } => "hot-dry-windy-gust",
        }
    }

    /// Whether the product needs a second cycle 24 h earlier.
    pub fn needs_previous_day(&self) -> bool {
        matches!(
            self,
            Product::Temperature24hChange
                | Product::RelativeHumidity24hChange
                | Product::WindSpeed24hChange
        )
    }

    /// Whether the product is a boolean mask rather than a grid.
    pub fn is_mask(&self) -> bool {
        matches!(self, Product::LowRelativeHumidity | Product::HotDryWindy { .. })
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Product {
    type Err = FireWxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('_', "-");
        Product::ALL
            .iter()
            .copied()
            .find(|p| p.name() == needle)
            .ok_or_else(|| {
                FireWxError::Config(format!(
                    "unknown product '{}' (expected one of: {})",
                    s,
                    Product::ALL.map(|p| p.name()).join(", ")
                ))
            })
    }
}
