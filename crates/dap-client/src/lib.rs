//! OPeNDAP (DAP2) dataset access.
//!
//! - Publication probes over HTTP (`.dds`, GrADS "not an available dataset")
//! - Slice reads through libnetcdf, which speaks DAP2 itself
//! - CF-style time axis decoding, including the GrADS Julian epoch
//! - Timeouts and exponential backoff for transient failures

pub mod client;
pub mod dataset;
pub mod error;
pub mod time;

pub use client::{DapClient, DapClientConfig, RetryPolicy};
pub use dataset::{read_slice, slice_index, GridSlice};
pub use error::{DapError, DapResult};
pub use time::{decode_time, TimeUnits};
