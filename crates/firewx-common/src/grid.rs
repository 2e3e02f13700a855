//! Gridded fields on the fixed native lat/lon grid of an analysis product.
//!
//! Values are stored row-major: row `i` corresponds to `lats[i]`, column `j`
//! to `lons[j]`. Missing points are `NaN`.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{FireWxError, FireWxResult};
use crate::time::AnalysisCycle;
use crate::variable::Units;

/// Coordinate vectors of a regular lat/lon grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCoords {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
}

impl GridCoords {
    pub fn new(lats: Vec<f64>, lons: Vec<f64>) -> Self {
        Self { lats, lons }
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.lats.len(), self.lons.len())
    }

    pub fn len(&self) -> usize {
        self.lats.len() * self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lats.is_empty() || self.lons.is_empty()
    }

    /// Whether longitudes use the [0, 360) convention.
    pub fn uses_360(&self) -> bool {
        self.lons.iter().any(|&lon| lon > 180.0)
    }

    /// Row and column indices falling inside `bbox`.
    pub fn indices_within(&self, bbox: &BoundingBox) -> (Vec<usize>, Vec<usize>) {
        let rows = self
            .lats
            .iter()
            .enumerate()
            .filter(|(_, &lat)| bbox.contains_lat(lat))
            .map(|(i, _)| i)
            .collect();
        let cols = self
            .lons
            .iter()
            .enumerate()
            .filter(|(_, &lon)| bbox.contains_lon(lon))
            .map(|(j, _)| j)
            .collect();
        (rows, cols)
    }

    /// Sub-grid coordinates for the given index lists.
    pub fn select(&self, rows: &[usize], cols: &[usize]) -> GridCoords {
        GridCoords {
            lats: rows.iter().map(|&i| self.lats[i]).collect(),
            lons: cols.iter().map(|&j| self.lons[j]).collect(),
        }
    }
}

/// Check that two coordinate sets describe the same grid.
///
/// Grids from one dataset share a single native grid, so equality is exact.
pub fn ensure_same_coords(
    a: &Arc<GridCoords>,
    b: &Arc<GridCoords>,
    context: &str,
) -> FireWxResult<()> {
    if Arc::ptr_eq(a, b) || a == b {
        return Ok(());
    }
    Err(FireWxError::GridAlignment(format!(
        "{}: coordinate grids differ ({}x{} vs {}x{})",
        context,
        a.lats.len(),
        a.lons.len(),
        b.lats.len(),
        b.lons.len()
    )))
}

/// A 2-D field for one variable at one analysis cycle.
///
/// Deserialization goes through [`VariableGrid::new`], so the shape
/// invariant holds for every instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VariableGridFields")]
pub struct VariableGrid {
    /// Field name, e.g. `tmp2m` or `rh2m`
    pub name: String,
    pub units: Units,
    pub cycle: AnalysisCycle,
    coords: Arc<GridCoords>,
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct VariableGridFields {
    name: String,
    units: Units,
    cycle: AnalysisCycle,
    coords: Arc<GridCoords>,
    values: Vec<f32>,
}

impl TryFrom<VariableGridFields> for VariableGrid {
    type Error = FireWxError;

    fn try_from(f: VariableGridFields) -> FireWxResult<Self> {
        VariableGrid::new(f.name, f.units, f.cycle, f.coords, f.values)
    }
}

impl VariableGrid {
    /// Build a grid, enforcing `values.len() == lats.len() * lons.len()`.
    pub fn new(
        name: impl Into<String>,
        units: Units,
        cycle: AnalysisCycle,
        coords: Arc<GridCoords>,
        values: Vec<f32>,
    ) -> FireWxResult<Self> {
        let name = name.into();
        if values.len() != coords.len() {
            return Err(FireWxError::InvalidGrid(format!(
                "{}: {} values for a {}x{} grid",
                name,
                values.len(),
                coords.lats.len(),
                coords.lons.len()
            )));
        }
        Ok(Self {
            name,
            units,
            cycle,
            coords,
            values,
        })
    }

    /// (rows, columns) == (lats.len(), lons.len())
    pub fn shape(&self) -> (usize, usize) {
        self.coords.shape()
    }

    pub fn lats(&self) -> &[f64] {
        &self.coords.lats
    }

    pub fn lons(&self) -> &[f64] {
        &self.coords.lons
    }

    pub fn coords(&self) -> &Arc<GridCoords> {
        &self.coords
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return None;
        }
        self.values.get(row * cols + col).copied()
    }

    /// New grid on the same coordinates with each value mapped.
    pub fn map(
        &self,
        name: impl Into<String>,
        units: Units,
        f: impl Fn(f32) -> f32,
    ) -> VariableGrid {
        VariableGrid {
            name: name.into(),
            units,
            cycle: self.cycle,
            coords: Arc::clone(&self.coords),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// New grid with the same metadata and replacement values.
    pub fn with_values(
        &self,
        name: impl Into<String>,
        units: Units,
        values: Vec<f32>,
    ) -> FireWxResult<VariableGrid> {
        VariableGrid::new(name, units, self.cycle, Arc::clone(&self.coords), values)
    }

    /// Fail unless `other` shares this grid's coordinates.
    pub fn ensure_same_coords(&self, other: &VariableGrid) -> FireWxResult<()> {
        ensure_same_coords(
            &self.coords,
            &other.coords,
            &format!("{} vs {}", self.name, other.name),
        )
    }

    /// Fail unless `other` shares this grid's coordinates and cycle.
    pub fn ensure_aligned(&self, other: &VariableGrid) -> FireWxResult<()> {
        self.ensure_same_coords(other)?;
        if self.cycle != other.cycle {
            return Err(FireWxError::GridAlignment(format!(
                "{} is valid at {} but {} is valid at {}",
                self.name, self.cycle, other.name, other.cycle
            )));
        }
        Ok(())
    }

    /// Summary statistics over non-missing points.
    pub fn stats(&self) -> GridStats {
        GridStats::from_values(&self.values)
    }

    /// Sub-grid of the points inside `bbox`.
    pub fn crop(&self, bbox: &BoundingBox) -> FireWxResult<VariableGrid> {
        let (rows, cols) = self.coords.indices_within(bbox);
        if rows.is_empty() || cols.is_empty() {
            return Err(FireWxError::InvalidGrid(format!(
                "{}: no grid points inside {:?}",
                self.name, bbox
            )));
        }

        let ncols = self.coords.lons.len();
        let mut values = Vec::with_capacity(rows.len() * cols.len());
        for &i in &rows {
            let row = &self.values[i * ncols..(i + 1) * ncols];
            values.extend(cols.iter().map(|&j| row[j]));
        }

        VariableGrid::new(
            self.name.clone(),
            self.units,
            self.cycle,
            Arc::new(self.coords.select(&rows, &cols)),
            values,
        )
    }
}

/// What produced a derived grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationKind {
    RelativeHumidity,
    UnitConverted,
    Delta24h,
}

/// A grid computed from one or more source grids, with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedGrid {
    pub grid: VariableGrid,
    pub kind: DerivationKind,
    pub valid_now: AnalysisCycle,
    /// For 24 h differences, the cycle actually used as "24 hours ago".
    pub valid_24h_ago: Option<AnalysisCycle>,
}

impl DerivedGrid {
    /// Derived grid valid at a single cycle.
    pub fn single(grid: VariableGrid, kind: DerivationKind) -> Self {
        let valid_now = grid.cycle;
        Self {
            grid,
            kind,
            valid_now,
            valid_24h_ago: None,
        }
    }

    /// Actual separation between the two cycles of a difference grid.
    pub fn actual_offset(&self) -> Option<Duration> {
        self.valid_24h_ago.map(|ago| self.valid_now.since(&ago))
    }

    /// True when the earlier cycle is exactly 24 h before the current one.
    pub fn nominal_offset_matches(&self) -> bool {
        self.actual_offset() == Some(Duration::hours(24))
    }

    pub fn crop(&self, bbox: &BoundingBox) -> FireWxResult<DerivedGrid> {
        Ok(DerivedGrid {
            grid: self.grid.crop(bbox)?,
            kind: self.kind,
            valid_now: self.valid_now,
            valid_24h_ago: self.valid_24h_ago,
        })
    }
}

impl std::ops::Deref for DerivedGrid {
    type Target = VariableGrid;

    fn deref(&self) -> &VariableGrid {
        &self.grid
    }
}

/// Min/max/mean over the non-missing values of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub mean: Option<f64>,
    pub valid_points: usize,
    pub missing_points: usize,
}

impl GridStats {
    pub fn from_values(values: &[f32]) -> Self {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut valid = 0usize;

        for &v in values.iter().filter(|v| !v.is_nan()) {
            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
            valid += 1;
        }

        if valid == 0 {
            return Self {
                min: None,
                max: None,
                mean: None,
                valid_points: 0,
                missing_points: values.len(),
            };
        }

        Self {
            min: Some(min),
            max: Some(max),
            mean: Some(sum / valid as f64),
            valid_points: valid,
            missing_points: values.len() - valid,
        }
    }
}
