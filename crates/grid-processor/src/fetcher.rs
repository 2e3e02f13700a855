//! Retrieval of one variable's grid for one resolved cycle.

use std::sync::Arc;

use firewx_common::{
    AnalysisCycle, FireWxError, FireWxResult, GridCoords, VariableGrid, VariableName,
};
use futures::future::try_join_all;
use metrics::counter;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::cache::GridCache;
use crate::source::{AnalysisSource, SourceGrid};

/// Fetches grids from a source, optionally through a [`GridCache`].
pub struct GridFetcher {
    source: Arc<dyn AnalysisSource>,
    cache: Option<Arc<GridCache>>,
    /// Coordinates of the native grid, shared by every fetched grid
    coords: RwLock<Option<Arc<GridCoords>>>,
}

impl GridFetcher {
    pub fn new(source: Arc<dyn AnalysisSource>) -> Self {
        Self::with_cache(source, Some(Arc::new(GridCache::new())))
    }

    pub fn with_cache(source: Arc<dyn AnalysisSource>, cache: Option<Arc<GridCache>>) -> Self {
        Self {
            source,
            cache,
            coords: RwLock::new(None),
        }
    }

    pub fn without_cache(source: Arc<dyn AnalysisSource>) -> Self {
        Self::with_cache(source, None)
    }

    pub fn cache(&self) -> Option<&Arc<GridCache>> {
        self.cache.as_ref()
    }

    /// Fetch a variable by dataset name (`tmp2m`, `dpt2m`, ...).
    pub async fn fetch(
        &self,
        cycle: AnalysisCycle,
        variable: &str,
    ) -> FireWxResult<Arc<VariableGrid>> {
        let variable: VariableName = variable.parse()?;
        self.fetch_variable(cycle, variable).await
    }

    /// Fetch one variable for one cycle.
    ///
    /// The slice read must be valid at exactly `cycle`; any other slice is a
    /// [`FireWxError::CycleMismatch`].
    #[instrument(skip(self), fields(cycle = %cycle, variable = %variable.as_str()))]
    pub async fn fetch_variable(
        &self,
        cycle: AnalysisCycle,
        variable: VariableName,
    ) -> FireWxResult<Arc<VariableGrid>> {
        let key = (cycle, variable);
        if let Some(cache) = &self.cache {
            if let Some(grid) = cache.get(&key).await {
                debug!("Grid cache hit");
                return Ok(grid);
            }
        }

        counter!("grid_fetches_total").increment(1);
        let raw = self.source.read_variable(cycle, variable).await?;
        let grid = Arc::new(self.build_grid(cycle, variable, raw).await?);

        match &self.cache {
            Some(cache) => Ok(cache.insert(key, grid).await),
            None => Ok(grid),
        }
    }

    /// Fetch several variables for one cycle concurrently.
    ///
    /// Results are in the order requested. The first failure fails the batch.
    pub async fn fetch_many(
        &self,
        cycle: AnalysisCycle,
        variables: &[VariableName],
    ) -> FireWxResult<Vec<Arc<VariableGrid>>> {
        try_join_all(variables.iter().map(|&v| self.fetch_variable(cycle, v))).await
    }

    async fn build_grid(
        &self,
        cycle: AnalysisCycle,
        variable: VariableName,
        raw: SourceGrid,
    ) -> FireWxResult<VariableGrid> {
        if raw.valid_time != cycle.valid_time() {
            counter!("grid_cycle_mismatches_total").increment(1);
            return Err(FireWxError::CycleMismatch {
                requested: cycle,
                found: raw.valid_time.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            });
        }

        let coords = self.shared_coords(GridCoords::new(raw.lats, raw.lons)).await;
        let values = mask_fill_values(raw.values, raw.fill_value);
        VariableGrid::new(variable.as_str(), variable.native_units(), cycle, coords, values)
    }

    /// Reuse the coordinate allocation when the grid is unchanged.
    async fn shared_coords(&self, coords: GridCoords) -> Arc<GridCoords> {
        if let Some(existing) = self.coords.read().await.as_ref() {
            if **existing == coords {
                return existing.clone();
            }
        }
        let coords = Arc::new(coords);
        *self.coords.write().await = Some(coords.clone());
        coords
    }
}

/// Replace fill values (and non-finite values) with NaN.
pub fn mask_fill_values(mut values: Vec<f32>, fill_value: Option<f64>) -> Vec<f32> {
    let fill = fill_value.map(|f| f as f32);
    for v in values.iter_mut() {
        let is_fill = match fill {
            Some(f) => *v == f || (f.abs() > 1e10 && (*v - f).abs() <= f.abs() * 1e-6),
            None => false,
        };
        if is_fill || !v.is_finite() {
            *v = f32::NAN;
        }
    }
    values
}
