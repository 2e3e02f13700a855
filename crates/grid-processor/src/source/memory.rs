//! In-memory source for offline runs and tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firewx_common::{AnalysisCycle, Cadence, FireWxError, FireWxResult, GridCoords, VariableName};

use super::{AnalysisSource, SourceGrid};

#[derive(Debug, Clone, Default)]
struct Dataset {
    /// Valid time reported by the slice; normally the cycle itself
    valid_time: Option<DateTime<Utc>>,
    variables: HashMap<VariableName, Vec<f32>>,
}

/// A set of published cycles held in memory, all on one grid.
pub struct MemorySource {
    cadence: Cadence,
    coords: GridCoords,
    fill_value: Option<f64>,
    datasets: RwLock<HashMap<AnalysisCycle, Dataset>>,
    failing: RwLock<HashSet<AnalysisCycle>>,
    probes: AtomicUsize,
    reads: AtomicUsize,
}

impl MemorySource {
    pub fn new(coords: GridCoords) -> Self {
        Self {
            cadence: Cadence::hourly(),
            coords,
            fill_value: None,
            datasets: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            probes: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Raw value that stands for "missing".
    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    /// Publish `values` for `variable` at `cycle`.
    pub fn publish(&self, cycle: AnalysisCycle, variable: VariableName, values: Vec<f32>) {
        let mut datasets = self.datasets.write().unwrap_or_else(|e| e.into_inner());
        datasets
            .entry(cycle)
            .or_default()
            .variables
            .insert(variable, values);
    }

    /// Publish several variables at once.
    pub fn publish_all(
        &self,
        cycle: AnalysisCycle,
        variables: impl IntoIterator<Item = (VariableName, Vec<f32>)>,
    ) {
        for (variable, values) in variables {
            self.publish(cycle, variable, values);
        }
    }

    /// Make the dataset for `cycle` report a different slice time.
    pub fn set_slice_time(&self, cycle: AnalysisCycle, valid_time: DateTime<Utc>) {
        let mut datasets = self.datasets.write().unwrap_or_else(|e| e.into_inner());
        datasets.entry(cycle).or_default().valid_time = Some(valid_time);
    }

    /// Make every request for `cycle` fail with a transient error.
    pub fn fail_cycle(&self, cycle: AnalysisCycle) {
        self.failing
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(cycle);
    }

    /// Number of `is_published` calls served.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }

    /// Number of `read_variable` calls served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    fn check_failing(&self, cycle: AnalysisCycle, variable: &str) -> FireWxResult<()> {
        let failing = self.failing.read().unwrap_or_else(|e| e.into_inner());
        if failing.contains(&cycle) {
            return Err(FireWxError::Fetch {
                variable: variable.to_string(),
                cycle,
                message: "simulated outage".to_string(),
                transient: true,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AnalysisSource for MemorySource {
    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn describe(&self, cycle: AnalysisCycle) -> String {
        format!("memory://{}", cycle)
    }

    async fn is_published(&self, cycle: AnalysisCycle) -> FireWxResult<bool> {
        self.probes.fetch_add(1, Ordering::Relaxed);
        self.check_failing(cycle, "dataset")?;
        let datasets = self.datasets.read().unwrap_or_else(|e| e.into_inner());
        Ok(datasets.contains_key(&cycle))
    }

    async fn read_variable(
        &self,
        cycle: AnalysisCycle,
        variable: VariableName,
    ) -> FireWxResult<SourceGrid> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.check_failing(cycle, variable.as_str())?;

        let datasets = self.datasets.read().unwrap_or_else(|e| e.into_inner());
        let missing = |message: String| FireWxError::Fetch {
            variable: variable.as_str().to_string(),
            cycle,
            message,
            transient: false,
        };
        let dataset = datasets
            .get(&cycle)
            .ok_or_else(|| missing(format!("{} is not published", cycle)))?;
        let values = dataset
            .variables
            .get(&variable)
            .ok_or_else(|| missing(format!("{} is not in {}", variable.as_str(), cycle)))?;

        Ok(SourceGrid {
            valid_time: dataset.valid_time.unwrap_or_else(|| cycle.valid_time()),
            lats: self.coords.lats.clone(),
            lons: self.coords.lons.clone(),
            values: values.clone(),
            fill_value: self.fill_value,
        })
    }
}
