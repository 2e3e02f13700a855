//! Access to OPeNDAP datasets with bounded retries.
//!
//! Probes are plain HTTP requests for the dataset's `.dds`; reads go through
//! libnetcdf (see [`crate::dataset`]) on a blocking thread. Both share one
//! retry loop.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use crate::dataset::{self, GridSlice};
use crate::error::{DapError, DapResult};

/// Retry policy for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first request
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_delay: Duration,
    /// Maximum retry delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// No retries; every failure is returned as-is.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Configuration for [`DapClient`].
#[derive(Debug, Clone)]
pub struct DapClientConfig {
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for DapClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }
}

/// Client for OPeNDAP datasets. Dataset locations are passed without suffix
/// (`.../akrtma20240701/akrtma_anl_12z`); anything that is not an
/// `http(s)://` URL is treated as a local NetCDF file.
#[derive(Debug, Clone)]
pub struct DapClient {
    http: Client,
    config: DapClientConfig,
}

impl DapClient {
    pub fn new(config: DapClientConfig) -> DapResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(DapError::Client)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &DapClientConfig {
        &self.config
    }

    /// Whether the dataset is published. "Not found" answers are `Ok(false)`;
    /// anything else that fails (after retries) is an error.
    #[instrument(skip(self))]
    pub async fn probe(&self, location: &str) -> DapResult<bool> {
        counter!("dap_probes_total").increment(1);

        if !is_remote(location) {
            return Ok(tokio::fs::try_exists(location).await.unwrap_or(false));
        }

        let url = format!("{}.dds", location);
        match self.with_retry(&url, || self.get_once(&url)).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                debug!(error = %e, "Dataset not published");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Read the `[lat, lon]` slice of `variable` valid at `valid_time`.
    #[instrument(skip(self))]
    pub async fn read_slice(
        &self,
        location: &str,
        variable: &str,
        valid_time: DateTime<Utc>,
    ) -> DapResult<GridSlice> {
        self.with_retry(location, || {
            let location = location.to_string();
            let variable = variable.to_string();
            async move {
                let read = tokio::task::spawn_blocking(move || {
                    dataset::read_slice(&location, &variable, valid_time)
                });
                match read.await {
                    Ok(result) => result,
                    Err(e) => Err(DapError::Task(e.to_string())),
                }
            }
        })
        .await
    }

    /// Run `op`, retrying transient failures with exponential backoff.
    async fn with_retry<T, F, Fut>(&self, target: &str, mut op: F) -> DapResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DapResult<T>>,
    {
        let policy = &self.config.retry;
        let mut attempt = 0;
        let mut delay = policy.initial_delay;

        loop {
            counter!("dap_requests_total").increment(1);
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > policy.max_retries {
                        return Err(DapError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }

                    warn!(
                        target_url = %target,
                        error = %e,
                        retry = attempt,
                        max_retries = policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "DAP request failed, retrying"
                    );
                    counter!("dap_retries_total").increment(1);

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, policy.max_delay);
                }
            }
        }
    }

    async fn get_once(&self, url: &str) -> DapResult<String> {
        let response = self.http.get(url).send().await.map_err(|source| DapError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DapError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(DapError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|source| DapError::Http {
            url: url.to_string(),
            source,
        })?;

        if let Some(message) = server_error_message(&text) {
            return Err(classify_server_error(message));
        }

        Ok(text)
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// The `message` of a DAP2 `Error { ... }` body, if the body is one.
///
/// GrADS Data Server answers requests for unknown datasets this way, with
/// HTTP 200.
fn server_error_message(body: &str) -> Option<String> {
    let body = body.trim_start();
    if !body.starts_with("Error") {
        return None;
    }
    let message = body
        .split_once("message")
        .and_then(|(_, rest)| rest.split_once('"'))
        .and_then(|(_, rest)| rest.split_once('"'))
        .map(|(message, _)| message.to_string());
    Some(message.unwrap_or_else(|| body.lines().take(4).collect::<Vec<_>>().join(" ")))
}

fn classify_server_error(message: String) -> DapError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("not an available dataset") || lower.contains("not found") {
        DapError::NotFound(message)
    } else {
        DapError::Server(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_classification() {
        let missing = classify_server_error(
            "/gradsdods/akrtma/akrtma20240701/akrtma_anl_12z is not an available dataset"
                .to_string(),
        );
        assert!(missing.is_not_found());

        let other = classify_server_error("variable foo not in dataset".to_string());
        assert!(matches!(other, DapError::Server(_)));
        assert!(!other.is_transient());
    }

    #[test]
    fn test_server_error_message() {
        let body = "Error {\n    code = 0;\n    message = \"/gradsdods/x is not an available dataset\";\n};\n";
        assert_eq!(
            server_error_message(body).as_deref(),
            Some("/gradsdods/x is not an available dataset")
        );
        assert!(server_error_message("Dataset {\n} x;\n").is_none());
    }

    #[test]
    fn test_remote_locations() {
        assert!(is_remote("https://nomads.ncep.noaa.gov/dods/akrtma"));
        assert!(is_remote("http://localhost:8080/dods"));
        assert!(!is_remote("/data/akrtma/akrtma_anl_12z.nc"));
    }

    #[test]
    fn test_default_policy_is_bounded() {
        let config = DapClientConfig::default();
        assert_eq!(config.retry.max_retries, 3);
        assert!(config.retry.initial_delay < config.retry.max_delay);
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }
}
