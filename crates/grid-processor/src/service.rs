//! High-level product computation.
//!
//! `ProductService` is the interface the plotting layer uses: it resolves
//! the cycle(s), fetches the raw grids concurrently, converts units once,
//! derives fields and builds masks.
//!
//! ```text
//! Product request
//!      │
//!      ▼
//! TimeResolver::resolve_latest ──► (resolve_for -24h, for change products)
//!      │
//!      ▼
//! GridFetcher::fetch_many (concurrent, cached)
//!      │
//!      ▼
//! units ──► derived ──► criteria
//!      │
//!      ▼
//! ProductOutput::{Grid, Mask}
//! ```

use std::sync::Arc;

use chrono::Duration;
use firewx_common::{
    AnalysisCycle, BoundingBox, Clock, CriteriaMask, DerivationKind, DerivedGrid, FireWxResult,
    GridStats, Units, VariableGrid, VariableName,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::{FireWxConfig, ThresholdConfig};
use crate::criteria::{hot_dry_windy, low_relative_humidity};
use crate::derived::{delta_24h, relative_humidity, relative_humidity_24h_change};
use crate::fetcher::GridFetcher;
use crate::products::{Product, WindField};
use crate::resolver::TimeResolver;
use crate::source::AnalysisSource;
use crate::units::{convert, kelvin_to_fahrenheit, ms_to_mph};

/// Result of computing a product.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductOutput {
    Grid(DerivedGrid),
    Mask(CriteriaMask),
}

impl ProductOutput {
    /// Cycle the product is valid at.
    pub fn valid_now(&self) -> AnalysisCycle {
        match self {
            ProductOutput::Grid(grid) => grid.valid_now,
            ProductOutput::Mask(mask) => mask.cycle,
        }
    }

    /// Earlier cycle used by change products.
    pub fn valid_24h_ago(&self) -> Option<AnalysisCycle> {
        match self {
            ProductOutput::Grid(grid) => grid.valid_24h_ago,
            ProductOutput::Mask(_) => None,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            ProductOutput::Grid(grid) => grid.shape(),
            ProductOutput::Mask(mask) => mask.shape(),
        }
    }

    pub fn crop(&self, bbox: &BoundingBox) -> FireWxResult<ProductOutput> {
        Ok(match self {
            ProductOutput::Grid(grid) => ProductOutput::Grid(grid.crop(bbox)?),
            ProductOutput::Mask(mask) => ProductOutput::Mask(mask.crop(bbox)?),
        })
    }

    pub fn as_grid(&self) -> Option<&DerivedGrid> {
        match self {
            ProductOutput::Grid(grid) => Some(grid),
            ProductOutput::Mask(_) => None,
        }
    }

    pub fn as_mask(&self) -> Option<&CriteriaMask> {
        match self {
            ProductOutput::Grid(_) => None,
            ProductOutput::Mask(mask) => Some(mask),
        }
    }

    /// Grid statistics, for grid products.
    pub fn stats(&self) -> Option<GridStats> {
        self.as_grid().map(|g| g.stats())
    }
}

/// Computes named products from one source.
pub struct ProductService {
    resolver: TimeResolver,
    fetcher: GridFetcher,
    thresholds: ThresholdConfig,
}

impl ProductService {
    pub fn new(resolver: TimeResolver, fetcher: GridFetcher, thresholds: ThresholdConfig) -> Self {
        Self {
            resolver,
            fetcher,
            thresholds,
        }
    }

    /// Wire a resolver and fetcher over `source` as configured.
    pub fn from_config(
        config: &FireWxConfig,
        source: Arc<dyn AnalysisSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let resolver =
            TimeResolver::new(source.clone(), clock).with_lookback(config.resolver.lookback_cycles);
        let fetcher = if config.cache.enabled {
            GridFetcher::new(source)
        } else {
            GridFetcher::without_cache(source)
        };
        Self::new(resolver, fetcher, config.thresholds.clone())
    }

    pub fn resolver(&self) -> &TimeResolver {
        &self.resolver
    }

    pub fn fetcher(&self) -> &GridFetcher {
        &self.fetcher
    }

    /// Compute `product` for the latest published cycle.
    pub async fn compute(&self, product: Product) -> FireWxResult<ProductOutput> {
        let now = self.resolver.resolve_latest().await?;
        self.compute_at(product, now).await
    }

    /// Compute `product` valid at `now` (already resolved).
    #[instrument(skip(self), fields(product = %product, cycle = %now))]
    pub async fn compute_at(
        &self,
        product: Product,
        now: AnalysisCycle,
    ) -> FireWxResult<ProductOutput> {
        let output = match product {
            Product::Temperature => {
                self.converted(now, VariableName::Tmp2m, Units::Fahrenheit).await?
            }
            Product::Dewpoint => {
                self.converted(now, VariableName::Dpt2m, Units::Fahrenheit).await?
            }
            Product::WindSpeed => {
                self.converted(now, VariableName::Wind10m, Units::MilesPerHour).await?
            }
            Product::WindGust => {
                self.converted(now, VariableName::Gust10m, Units::MilesPerHour).await?
            }
            Product::RelativeHumidity => ProductOutput::Grid(self.relative_humidity(now).await?),
            Product::Temperature24hChange => {
                self.change(now, VariableName::Tmp2m, Units::Fahrenheit).await?
            }
            Product::WindSpeed24hChange => {
                self.change(now, VariableName::Wind10m, Units::MilesPerHour).await?
            }
            Product::RelativeHumidity24hChange => {
                let ago = self.previous_day(now).await?;
                let pair = [VariableName::Tmp2m, VariableName::Dpt2m];
                let (current, earlier) = tokio::try_join!(
                    self.fetcher.fetch_many(now, &pair),
                    self.fetcher.fetch_many(ago, &pair)
                )?;
                ProductOutput::Grid(relative_humidity_24h_change(
                    &current[0],
                    &current[1],
                    &earlier[0],
                    &earlier[1],
                )?)
            }
            Product::LowRelativeHumidity => {
                let rh = self.relative_humidity(now).await?;
                ProductOutput::Mask(low_relative_humidity(
                    &rh,
                    &self.thresholds.low_relative_humidity,
                )?)
            }
            Product::HotDryWindy { wind } => {
                let wind_var = match wind {
                    WindField::Sustained => VariableName::Wind10m,
                    WindField::Gust => VariableName::Gust10m,
                };
                let grids = self
                    .fetcher
                    .fetch_many(now, &[VariableName::Tmp2m, VariableName::Dpt2m, wind_var])
                    .await?;
                let rh = relative_humidity(&grids[0], &grids[1])?;
                let temperature_f = kelvin_to_fahrenheit(&grids[0])?;
                let wind_mph = ms_to_mph(&grids[2])?;
                ProductOutput::Mask(hot_dry_windy(
                    &temperature_f,
                    &rh,
                    &wind_mph,
                    &self.thresholds.hot_dry_windy,
                )?)
            }
        };

        match &output {
            ProductOutput::Grid(grid) => info!(
                valid_24h_ago = ?grid.valid_24h_ago.map(|c| c.to_string()),
                "Computed grid product"
            ),
            ProductOutput::Mask(mask) => info!(flagged = mask.count(), "Computed mask product"),
        }
        Ok(output)
    }

    async fn previous_day(&self, now: AnalysisCycle) -> FireWxResult<AnalysisCycle> {
        self.resolver.resolve_for(now, Duration::hours(-24)).await
    }

    async fn converted(
        &self,
        cycle: AnalysisCycle,
        variable: VariableName,
        target: Units,
    ) -> FireWxResult<ProductOutput> {
        let raw = self.fetcher.fetch_variable(cycle, variable).await?;
        let grid = convert(&raw, target)?;
        Ok(ProductOutput::Grid(DerivedGrid::single(grid, DerivationKind::UnitConverted)))
    }

    async fn relative_humidity(&self, cycle: AnalysisCycle) -> FireWxResult<DerivedGrid> {
        let grids = self
            .fetcher
            .fetch_many(cycle, &[VariableName::Tmp2m, VariableName::Dpt2m])
            .await?;
        relative_humidity(&grids[0], &grids[1])
    }

    /// Same variable at `now` and at the resolved previous-day cycle.
    async fn change(
        &self,
        now: AnalysisCycle,
        variable: VariableName,
        target: Units,
    ) -> FireWxResult<ProductOutput> {
        let ago = self.previous_day(now).await?;
        let (current, earlier) = tokio::try_join!(
            self.fetcher.fetch_variable(now, variable),
            self.fetcher.fetch_variable(ago, variable)
        )?;
        let current: VariableGrid = convert(&current, target)?;
        let earlier: VariableGrid = convert(&earlier, target)?;
        Ok(ProductOutput::Grid(delta_24h(&current, &earlier)?))
    }
}
