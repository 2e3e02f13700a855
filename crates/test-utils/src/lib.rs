//! Test support for the firewx workspace.
//!
//! - Synthetic surface fields on a small Alaska lat/lon grid
//! - NetCDF files laid out like RTMA analysis datasets, and GrADS server
//!   responses for publication probes
//! - A stub HTTP server that records request targets
//! - Paths to the shipped `config/` directory
//!
//! Pull it in as a dev-dependency: `test-utils = { path = "../test-utils" }`.

pub mod fixtures;
pub mod generators;
pub mod paths;
pub mod stub_server;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;
pub use stub_server::{StubResponse, StubServer};

/// Asserts `|left - right| <= epsilon`, comparing as `f64`.
///
/// ```ignore
/// assert_approx_eq!(grid.values()[0], 80.33, 0.01);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (l, r, eps) = ($left as f64, $right as f64, $epsilon as f64);
        if !((l - r).abs() <= eps) {
            panic!("approx assertion failed: {} vs {} (|diff| {} > {})", l, r, (l - r).abs(), eps);
        }
    }};
}

/// Elementwise [`assert_approx_eq!`] over two slices. NaN must line up
/// with NaN.
#[macro_export]
macro_rules! assert_values_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = &$left;
        let right = &$right;
        assert_eq!(left.len(), right.len(), "length mismatch");
        for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            let (l, r) = (*l as f64, *r as f64);
            if l.is_nan() || r.is_nan() {
                assert!(l.is_nan() && r.is_nan(), "NaN mismatch at index {}: {} vs {}", i, l, r);
                continue;
            }
            if (l - r).abs() > $epsilon as f64 {
                panic!(
                    "approx assertion failed at index {}: {} vs {} (epsilon {})",
                    i, l, r, $epsilon
                );
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_within_epsilon() {
        assert_approx_eq!(273.15f32, 273.15f64, 1e-4);
        assert_approx_eq!(-40.0, -40.00001, 1e-3);
    }

    #[test]
    #[should_panic(expected = "approx assertion failed")]
    fn test_approx_outside_epsilon() {
        assert_approx_eq!(22.4, 22.3694, 1e-3);
    }

    #[test]
    fn test_values_approx_with_nans() {
        assert_values_approx_eq!(vec![1.0f32, f32::NAN], vec![1.00001f32, f32::NAN], 0.001);
    }

    #[test]
    #[should_panic(expected = "NaN mismatch")]
    fn test_values_approx_nan_mismatch() {
        assert_values_approx_eq!(vec![f32::NAN], vec![1.0f32], 0.001);
    }
}
