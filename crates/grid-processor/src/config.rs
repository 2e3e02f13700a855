//! Configuration for the fire-weather core.
//!
//! Loaded from `config/firewx.yaml`; every field has a default so a partial
//! (or empty) file is valid. A few settings can be overridden from the
//! environment.

use std::path::Path;
use std::time::Duration;

use dap_client::{DapClientConfig, RetryPolicy};
use firewx_common::{
    Cadence, FireWxError, FireWxResult, HotDryWindyThresholds, LowRelativeHumidityThreshold,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::resolver::DEFAULT_LOOKBACK_CYCLES;
use crate::source::DEFAULT_URL_TEMPLATE;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FireWxConfig {
    pub source: SourceConfig,
    pub resolver: ResolverConfig,
    pub thresholds: ThresholdConfig,
    pub cache: CacheConfig,
}

/// Upstream dataset access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Dataset URL with `{date}` (YYYYMMDD) and `{hour}` (HH) placeholders
    pub url_template: String,
    pub cadence_minutes: u32,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            cadence_minutes: 60,
            request_timeout_secs: 120,
            connect_timeout_secs: 15,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry policy for transient failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Cycles probed per resolution, including the starting one
    pub lookback_cycles: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lookback_cycles: DEFAULT_LOOKBACK_CYCLES,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub hot_dry_windy: HotDryWindyThresholds,
    pub low_relative_humidity: LowRelativeHumidityThreshold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl FireWxConfig {
    pub fn from_yaml_str(yaml: &str) -> FireWxResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: FireWxConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> FireWxResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FireWxError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), "Loaded firewx config");
        Ok(config)
    }

    /// Apply environment overrides on top of the loaded values.
    pub fn apply_env(mut self) -> FireWxResult<Self> {
        if let Ok(val) = std::env::var("FIREWX_BASE_URL") {
            self.source.url_template = val;
        }

        if let Ok(val) = std::env::var("FIREWX_LOOKBACK_CYCLES") {
            self.resolver.lookback_cycles = val.parse().map_err(|_| {
                FireWxError::Config(format!("FIREWX_LOOKBACK_CYCLES is not a number: {}", val))
            })?;
        }

        if let Ok(val) = std::env::var("FIREWX_MAX_RETRIES") {
            self.source.retry.max_retries = val.parse().map_err(|_| {
                FireWxError::Config(format!("FIREWX_MAX_RETRIES is not a number: {}", val))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> FireWxResult<Self> {
        Self::default().apply_env()
    }

    pub fn validate(&self) -> FireWxResult<()> {
        let template = &self.source.url_template;
        if !template.contains("{date}") || !template.contains("{hour}") {
            return Err(FireWxError::Config(format!(
                "url_template must contain {{date}} and {{hour}}: {}",
                self.source.url_template
            )));
        }
        if self.source.cadence_minutes == 0 {
            return Err(FireWxError::Config("cadence_minutes must be positive".to_string()));
        }
        if self.resolver.lookback_cycles == 0 {
            return Err(FireWxError::Config("lookback_cycles must be at least 1".to_string()));
        }
        if self.source.request_timeout_secs == 0 || self.source.connect_timeout_secs == 0 {
            return Err(FireWxError::Config("timeouts must be positive".to_string()));
        }
        Ok(())
    }

    pub fn cadence(&self) -> Cadence {
        Cadence::from_minutes(self.source.cadence_minutes)
    }

    pub fn dap_client_config(&self) -> DapClientConfig {
        let retry = &self.source.retry;
        DapClientConfig {
            request_timeout: Duration::from_secs(self.source.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.source.connect_timeout_secs),
            retry: RetryPolicy {
                max_retries: retry.max_retries,
                initial_delay: Duration::from_millis(retry.initial_delay_ms),
                max_delay: Duration::from_millis(retry.max_delay_ms.max(retry.initial_delay_ms)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FireWxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolver.lookback_cycles, 6);
        assert_eq!(config.thresholds.hot_dry_windy.temperature_f, 75.0);
        assert_eq!(config.thresholds.low_relative_humidity.relative_humidity_pct, 25.0);
        assert!(config.cache.enabled);
        assert_eq!(config.cadence(), Cadence::hourly());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
resolver:
  lookback_cycles: 3
thresholds:
  hot_dry_windy:
    wind_mph: 20
"#;
        let config = FireWxConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.resolver.lookback_cycles, 3);
        assert_eq!(config.thresholds.hot_dry_windy.wind_mph, 20.0);
        assert_eq!(config.thresholds.hot_dry_windy.temperature_f, 75.0);
        assert_eq!(config.source.retry.max_retries, 3);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = FireWxConfig::from_yaml_str("  \n").unwrap();
        assert_eq!(config.source.url_template, DEFAULT_URL_TEMPLATE);
    }

    #[test]
    fn test_invalid_template_rejected() {
        let yaml = "source:\n  url_template: \"https://example.com/fixed\"\n";
        assert!(matches!(FireWxConfig::from_yaml_str(yaml), Err(FireWxError::Config(_))));
    }

    #[test]
    fn test_dap_client_config() {
        let config = FireWxConfig::default();
        let dap = config.dap_client_config();
        assert_eq!(dap.retry.max_retries, 3);
        assert_eq!(dap.request_timeout, Duration::from_secs(120));
        assert_eq!(dap.retry.initial_delay, Duration::from_millis(500));
    }
}
