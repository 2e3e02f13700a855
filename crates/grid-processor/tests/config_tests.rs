//! Configuration files and environment overrides.

use firewx_common::{FireWxError, RegionTable};
use grid_processor::{FireWxConfig, DEFAULT_URL_TEMPLATE};
use test_utils::{config_dir, temp_file_with};

#[test]
fn test_shipped_config_matches_defaults() {
    let shipped = FireWxConfig::load(&config_dir().join("firewx.yaml")).unwrap();
    let defaults = FireWxConfig::default();
    assert_eq!(shipped.source.url_template, DEFAULT_URL_TEMPLATE);
    assert_eq!(shipped.resolver.lookback_cycles, defaults.resolver.lookback_cycles);
    assert_eq!(shipped.thresholds.hot_dry_windy, defaults.thresholds.hot_dry_windy);
    assert_eq!(
        shipped.thresholds.low_relative_humidity,
        defaults.thresholds.low_relative_humidity
    );
}

#[test]
fn test_shipped_regions_are_valid() {
    let regions = RegionTable::load(&config_dir().join("regions.yaml")).unwrap();
    assert!(regions.len() >= 3);
    let alaska = regions.get("ALASKA").unwrap();
    let kenai = regions.get("kenai").unwrap();
    assert!(alaska.contains(kenai.min_lon, kenai.min_lat));
    assert!(matches!(regions.get("hawaii"), Err(FireWxError::Config(_))));
}

#[test]
fn test_missing_file_is_config_error() {
    let err = FireWxConfig::load(&config_dir().join("does-not-exist.yaml")).unwrap_err();
    assert!(matches!(err, FireWxError::Config(_)));
}

#[test]
fn test_malformed_yaml_is_config_error() {
    let (_dir, path) = temp_file_with("firewx.yaml", "resolver: [not, a, map]\n");
    assert!(matches!(FireWxConfig::load(&path), Err(FireWxError::Config(_))));
}

// The only test in this binary that touches the process environment.
#[test]
fn test_environment_overrides() {
    std::env::set_var("FIREWX_BASE_URL", "http://mirror.example/akrtma{date}/anl_{hour}z");
    std::env::set_var("FIREWX_LOOKBACK_CYCLES", "12");
    std::env::set_var("FIREWX_MAX_RETRIES", "1");

    let config = FireWxConfig::from_env().unwrap();
    assert_eq!(config.source.url_template, "http://mirror.example/akrtma{date}/anl_{hour}z");
    assert_eq!(config.resolver.lookback_cycles, 12);
    assert_eq!(config.dap_client_config().retry.max_retries, 1);

    std::env::set_var("FIREWX_LOOKBACK_CYCLES", "many");
    assert!(matches!(FireWxConfig::from_env(), Err(FireWxError::Config(_))));

    std::env::set_var("FIREWX_LOOKBACK_CYCLES", "6");
    std::env::set_var("FIREWX_BASE_URL", "http://mirror.example/static.nc");
    assert!(matches!(FireWxConfig::from_env(), Err(FireWxError::Config(_))));

    std::env::remove_var("FIREWX_BASE_URL");
    std::env::remove_var("FIREWX_LOOKBACK_CYCLES");
    std::env::remove_var("FIREWX_MAX_RETRIES");
}
