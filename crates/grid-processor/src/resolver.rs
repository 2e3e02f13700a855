//! Resolution of the analysis cycle to read.
//!
//! Both operations walk backward one cycle at a time from a starting cycle,
//! probing the source, and stop at the first published cycle. The walk is
//! bounded by the lookback window. Only a definite "not published" moves the
//! walk to an earlier cycle: a probe that fails (after the source's own
//! retries) ends resolution with [`FireWxError::UnavailableData`], since the
//! newer cycle may well exist.

use std::sync::Arc;

use chrono::Duration;
use firewx_common::{AnalysisCycle, Cadence, Clock, FireWxError, FireWxResult};
use metrics::counter;
use tracing::{debug, info, instrument, warn};

use crate::source::AnalysisSource;

/// Current cycle plus five earlier ones.
pub const DEFAULT_LOOKBACK_CYCLES: u32 = 6;

/// Finds published cycles on a source.
pub struct TimeResolver {
    source: Arc<dyn AnalysisSource>,
    clock: Arc<dyn Clock>,
    lookback: u32,
}

impl TimeResolver {
    pub fn new(source: Arc<dyn AnalysisSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            lookback: DEFAULT_LOOKBACK_CYCLES,
        }
    }

    /// Number of cycles probed per resolution (at least one).
    pub fn with_lookback(mut self, cycles: u32) -> Self {
        self.lookback = cycles.max(1);
        self
    }

    pub fn lookback(&self) -> u32 {
        self.lookback
    }

    pub fn cadence(&self) -> Cadence {
        self.source.cadence()
    }

    /// Latest published cycle at or before "now".
    pub async fn resolve_latest(&self) -> FireWxResult<AnalysisCycle> {
        let start = AnalysisCycle::truncate(self.clock.now(), self.cadence());
        self.walk_back(start).await
    }

    /// Latest published cycle at or before `reference + offset`.
    ///
    /// With `offset = -24h` this gives the "24 hours ago" cycle; if that
    /// exact cycle is missing the nearest earlier one is returned and the
    /// caller can see the real separation from the returned cycle.
    pub async fn resolve_for(
        &self,
        reference: AnalysisCycle,
        offset: Duration,
    ) -> FireWxResult<AnalysisCycle> {
        let start = reference.offset(offset, self.cadence());
        self.walk_back(start).await
    }

    #[instrument(skip(self), fields(start = %start, lookback = self.lookback))]
    async fn walk_back(&self, start: AnalysisCycle) -> FireWxResult<AnalysisCycle> {
        let cadence = self.cadence();
        let mut cycle = start;

        for step in 0..self.lookback {
            match self.source.is_published(cycle).await {
                Ok(true) => {
                    counter!("resolver_hits_total").increment(1);
                    info!(cycle = %cycle, steps_back = step, "Resolved analysis cycle");
                    return Ok(cycle);
                }
                Ok(false) => {
                    debug!(
                        cycle = %cycle,
                        location = %self.source.describe(cycle),
                        "Cycle not published"
                    );
                }
                Err(e) => {
                    warn!(cycle = %cycle, error = %e, "Availability probe failed");
                    counter!("resolver_probe_failures_total").increment(1);
                    return Err(FireWxError::UnavailableData {
                        start,
                        lookback: self.lookback,
                        reason: format!("availability of {} unknown: {}", cycle, e),
                    });
                }
            }
            cycle = cycle.previous(cadence);
        }

        counter!("resolver_exhausted_total").increment(1);
        Err(FireWxError::UnavailableData {
            start,
            lookback: self.lookback,
            reason: "no published cycle in window".to_string(),
        })
    }
}
