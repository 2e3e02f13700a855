//! Fire-weather analysis core.
//!
//! Turns a remote, time-indexed surface analysis (the Alaska RTMA on NOMADS)
//! into the grids and masks behind fire-weather graphics:
//!
//! - **Cycle resolution**: latest published cycle, and the cycle 24 h earlier,
//!   each validated independently against the source
//! - **Grid retrieval**: exact-cycle reads with a process-local cache
//! - **Unit conversion**: K to °F/°C, m/s to mph, Pa to hPa, m to miles
//! - **Derived fields**: relative humidity and 24 h changes
//! - **Criteria masks**: hot/dry/windy and low relative humidity
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{FireWxConfig, OpendapSource, Product, ProductService};
//!
//! let config = FireWxConfig::from_env()?;
//! let client = DapClient::new(config.dap_client_config())?;
//! let template = &config.source.url_template;
//! let source = Arc::new(OpendapSource::new(client, template, config.cadence()));
//! let service = ProductService::from_config(&config, source, Arc::new(SystemClock));
//!
//! let output = service.compute(Product::RelativeHumidity).await?;
//! ```

pub mod cache;
pub mod config;
pub mod criteria;
pub mod derived;
pub mod fetcher;
pub mod products;
pub mod resolver;
pub mod service;
pub mod source;
pub mod units;

// Re-export commonly used types at crate root
pub use cache::{CacheStats, GridCache, GridKey};
pub use config::{
    CacheConfig, FireWxConfig, ResolverConfig, RetryConfig, SourceConfig, ThresholdConfig,
};
pub use criteria::{hot_dry_windy, low_relative_humidity};
pub use derived::{delta_24h, relative_humidity, relative_humidity_24h_change};
pub use fetcher::GridFetcher;
pub use products::{Product, WindField};
pub use resolver::{TimeResolver, DEFAULT_LOOKBACK_CYCLES};
pub use service::{ProductOutput, ProductService};
pub use source::{AnalysisSource, MemorySource, OpendapSource, SourceGrid, DEFAULT_URL_TEMPLATE};
