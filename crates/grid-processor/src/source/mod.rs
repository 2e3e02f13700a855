//! Analysis sources: where published cycles and raw grids come from.

mod memory;
mod opendap;

pub use memory::MemorySource;
pub use opendap::{OpendapSource, DEFAULT_URL_TEMPLATE};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firewx_common::{AnalysisCycle, Cadence, FireWxResult, VariableName};

/// One time slice of one variable as delivered by a source.
///
/// Values are raw: fill values have not been replaced yet.
#[derive(Debug, Clone)]
pub struct SourceGrid {
    /// Valid time of the slice that was actually read
    pub valid_time: DateTime<Utc>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Row-major, `lats.len() * lons.len()` values
    pub values: Vec<f32>,
    pub fill_value: Option<f64>,
}

/// A time-indexed gridded dataset.
///
/// Implementations must be safe to call concurrently; probes are idempotent.
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    /// Publication cadence of the dataset.
    fn cadence(&self) -> Cadence;

    /// Human-readable location of a cycle's data, for logs.
    fn describe(&self, cycle: AnalysisCycle) -> String;

    /// Whether the cycle is published. Errors mean the answer is unknown.
    async fn is_published(&self, cycle: AnalysisCycle) -> FireWxResult<bool>;

    /// Read the 2-D field of `variable` for `cycle`.
    async fn read_variable(
        &self,
        cycle: AnalysisCycle,
        variable: VariableName,
    ) -> FireWxResult<SourceGrid>;
}
