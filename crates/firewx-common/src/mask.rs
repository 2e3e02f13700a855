//! Boolean criteria masks and the thresholds that produce them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{FireWxError, FireWxResult};
use crate::grid::GridCoords;
use crate::time::AnalysisCycle;

/// Thresholds for the hot/dry/windy criterion.
///
/// Defaults follow common fire-weather practice: 75 °F, 25 % RH, 15 mph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotDryWindyThresholds {
    /// Minimum temperature (°F), inclusive
    pub temperature_f: f32,
    /// Maximum relative humidity (%), inclusive
    pub relative_humidity_pct: f32,
    /// Minimum wind speed or gust (mph), inclusive
    pub wind_mph: f32,
}

impl Default for HotDryWindyThresholds {
    fn default() -> Self {
        Self {
            temperature_f: 75.0,
            relative_humidity_pct: 25.0,
            wind_mph: 15.0,
        }
    }
}

/// Threshold for the low relative humidity criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowRelativeHumidityThreshold {
    /// Maximum relative humidity (%), inclusive
    pub relative_humidity_pct: f32,
}

impl Default for LowRelativeHumidityThreshold {
    fn default() -> Self {
        Self {
            relative_humidity_pct: 25.0,
        }
    }
}

/// The criterion a mask was built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "criterion", rename_all = "snake_case")]
pub enum MaskCriteria {
    HotDryWindy(HotDryWindyThresholds),
    LowRelativeHumidity(LowRelativeHumidityThreshold),
}

/// A boolean grid flagging points that meet a compound threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CriteriaMaskFields")]
pub struct CriteriaMask {
    pub cycle: AnalysisCycle,
    pub criteria: MaskCriteria,
    coords: Arc<GridCoords>,
    values: Vec<bool>,
}

#[derive(Deserialize)]
struct CriteriaMaskFields {
    cycle: AnalysisCycle,
    criteria: MaskCriteria,
    coords: Arc<GridCoords>,
    values: Vec<bool>,
}

impl TryFrom<CriteriaMaskFields> for CriteriaMask {
    type Error = FireWxError;

    fn try_from(f: CriteriaMaskFields) -> FireWxResult<Self> {
        CriteriaMask::new(f.cycle, f.criteria, f.coords, f.values)
    }
}

impl CriteriaMask {
    pub fn new(
        cycle: AnalysisCycle,
        criteria: MaskCriteria,
        coords: Arc<GridCoords>,
        values: Vec<bool>,
    ) -> FireWxResult<Self> {
        if values.len() != coords.len() {
            return Err(FireWxError::InvalidGrid(format!(
                "mask has {} values for a {}x{} grid",
                values.len(),
                coords.lats.len(),
                coords.lons.len()
            )));
        }
        Ok(Self {
            cycle,
            criteria,
            coords,
            values,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.coords.shape()
    }

    pub fn lats(&self) -> &[f64] {
        &self.coords.lats
    }

    pub fn lons(&self) -> &[f64] {
        &self.coords.lons
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    /// Number of flagged points.
    pub fn count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }

    /// True when no point is flagged. Presentation code uses this to decide
    /// whether to draw a panel at all.
    pub fn is_empty(&self) -> bool {
        !self.values.iter().any(|&v| v)
    }

    pub fn all(&self) -> bool {
        self.values.iter().all(|&v| v)
    }

    /// (lon, lat) of every flagged point.
    pub fn flagged_points(&self) -> Vec<(f64, f64)> {
        let ncols = self.coords.lons.len();
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(idx, _)| (self.coords.lons[idx % ncols], self.coords.lats[idx / ncols]))
            .collect()
    }

    /// Sub-mask of the points inside `bbox`.
    pub fn crop(&self, bbox: &BoundingBox) -> FireWxResult<CriteriaMask> {
        let (rows, cols) = self.coords.indices_within(bbox);
        if rows.is_empty() || cols.is_empty() {
            return Err(FireWxError::InvalidGrid(format!(
                "mask: no grid points inside {:?}",
                bbox
            )));
        }

        let ncols = self.coords.lons.len();
        let mut values = Vec::with_capacity(rows.len() * cols.len());
        for &i in &rows {
            values.extend(cols.iter().map(|&j| self.values[i * ncols + j]));
        }

        CriteriaMask::new(
            self.cycle,
            self.criteria,
            Arc::new(self.coords.select(&rows, &cols)),
            values,
        )
    }
}
