//! Error types for the fire-weather analysis core.

use thiserror::Error;

use crate::time::AnalysisCycle;

/// Result type alias using FireWxError.
pub type FireWxResult<T> = Result<T, FireWxError>;

/// Primary error type for cycle resolution, grid retrieval and derivation.
///
/// None of these are swallowed inside the core: every stage either produces
/// its complete output or returns one of these to the caller.
#[derive(Debug, Error)]
pub enum FireWxError {
    // === Time resolution ===
    #[error("No published analysis found within {lookback} cycles starting at {start}: {reason}")]
    UnavailableData {
        start: AnalysisCycle,
        lookback: u32,
        reason: String,
    },

    // === Retrieval ===
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Requested cycle {requested} but dataset slice is valid at {found}")]
    CycleMismatch {
        requested: AnalysisCycle,
        found: String,
    },

    #[error("Failed to fetch {variable} for {cycle}: {message}")]
    Fetch {
        variable: String,
        cycle: AnalysisCycle,
        message: String,
        transient: bool,
    },

    // === Derivation ===
    #[error("Grid alignment error: {0}")]
    GridAlignment(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    // === Configuration ===
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FireWxError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FireWxError::Fetch { transient: true, .. })
    }

    /// Short machine-readable code, used in structured logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            FireWxError::UnavailableData { .. } => "unavailable_data",
            FireWxError::UnknownVariable(_) => "unknown_variable",
            FireWxError::CycleMismatch { .. } => "cycle_mismatch",
            FireWxError::Fetch { .. } => "fetch",
            FireWxError::GridAlignment(_) => "grid_alignment",
            FireWxError::InvalidGrid(_) => "invalid_grid",
            FireWxError::Config(_) => "config",
        }
    }
}

impl From<serde_yaml::Error> for FireWxError {
    fn from(err: serde_yaml::Error) -> Self {
        FireWxError::Config(format!("YAML error: {}", err))
    }
}

impl From<std::io::Error> for FireWxError {
    fn from(err: std::io::Error) -> Self {
        FireWxError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_transient_only_for_fetch() {
        let cycle = AnalysisCycle::hourly(Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap());
        let fetch = FireWxError::Fetch {
            variable: "tmp2m".to_string(),
            cycle,
            message: "timeout".to_string(),
            transient: true,
        };
        assert!(fetch.is_transient());
        assert!(!FireWxError::GridAlignment("x".to_string()).is_transient());
        assert_eq!(fetch.code(), "fetch");
    }
}
