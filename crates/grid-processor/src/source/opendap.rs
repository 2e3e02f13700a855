//! OPeNDAP-backed source (NOMADS GrADS Data Server layout: one dataset per cycle).

use async_trait::async_trait;
use dap_client::{DapClient, DapError, GridSlice};
use firewx_common::{AnalysisCycle, Cadence, FireWxError, FireWxResult, VariableName};
use tracing::instrument;

use super::{AnalysisSource, SourceGrid};

/// Alaska RTMA analyses on NOMADS. `{date}` is `YYYYMMDD`, `{hour}` is `HH`.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://nomads.ncep.noaa.gov/dods/akrtma/akrtma{date}/akrtma_anl_{hour}z";

/// Reads analyses from a DAP server, one dataset URL per cycle.
///
/// The template may also name local NetCDF files with the same layout.
pub struct OpendapSource {
    client: DapClient,
    url_template: String,
    cadence: Cadence,
}

impl OpendapSource {
    pub fn new(client: DapClient, url_template: impl Into<String>, cadence: Cadence) -> Self {
        Self {
            client,
            url_template: url_template.into(),
            cadence,
        }
    }

    /// Dataset URL for a cycle.
    pub fn dataset_url(&self, cycle: AnalysisCycle) -> String {
        self.url_template
            .replace("{date}", &cycle.date_string())
            .replace("{hour}", &cycle.hour_string())
            .replace("{minute}", &cycle.valid_time().format("%M").to_string())
    }
}

impl From<GridSlice> for SourceGrid {
    fn from(slice: GridSlice) -> Self {
        SourceGrid {
            valid_time: slice.valid_time,
            lats: slice.lats,
            lons: slice.lons,
            values: slice.values,
            fill_value: slice.fill_value,
        }
    }
}

fn fetch_error(variable: &str, cycle: AnalysisCycle, err: DapError) -> FireWxError {
    FireWxError::Fetch {
        variable: variable.to_string(),
        cycle,
        transient: err.is_transient(),
        message: err.to_string(),
    }
}

#[async_trait]
impl AnalysisSource for OpendapSource {
    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn describe(&self, cycle: AnalysisCycle) -> String {
        self.dataset_url(cycle)
    }

    async fn is_published(&self, cycle: AnalysisCycle) -> FireWxResult<bool> {
        self.client
            .probe(&self.dataset_url(cycle))
            .await
            .map_err(|e| fetch_error("dataset", cycle, e))
    }

    #[instrument(skip(self), fields(cycle = %cycle, variable = %variable.as_str()))]
    async fn read_variable(
        &self,
        cycle: AnalysisCycle,
        variable: VariableName,
    ) -> FireWxResult<SourceGrid> {
        let url = self.dataset_url(cycle);
        self.client
            .read_slice(&url, variable.as_str(), cycle.valid_time())
            .await
            .map(SourceGrid::from)
            .map_err(|e| fetch_error(variable.as_str(), cycle, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dap_client::DapClientConfig;

    #[test]
    fn test_dataset_url_from_template() {
        let client = DapClient::new(DapClientConfig::default()).unwrap();
        let source = OpendapSource::new(client, DEFAULT_URL_TEMPLATE, Cadence::hourly());
        let cycle = AnalysisCycle::hourly(Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap());
        assert_eq!(
            source.dataset_url(cycle),
            "https://nomads.ncep.noaa.gov/dods/akrtma/akrtma20240701/akrtma_anl_09z"
        );
        assert_eq!(source.describe(cycle), source.dataset_url(cycle));
    }
}
