//! Error types for OPeNDAP access.

use thiserror::Error;

/// Result type for DAP client operations.
pub type DapResult<T> = Result<T, DapError>;

// libnetcdf status codes for failures below the DAP layer (curl, socket I/O)
const NC_ECURL: i32 = -67;
const NC_EIO: i32 = -68;

/// Error types for dataset probes and reads.
#[derive(Error, Debug)]
pub enum DapError {
    // === HTTP (probes) ===
    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The server does not (yet) publish the requested dataset
    #[error("Dataset not available: {0}")]
    NotFound(String),

    /// The server answered with a DAP `Error { ... }` body
    #[error("Server error: {0}")]
    Server(String),

    // === NetCDF (reads) ===
    /// libnetcdf failed to open or read the dataset
    #[error("NetCDF access to {location} failed: {source}")]
    NetCdf {
        location: String,
        #[source]
        source: netcdf::Error,
    },

    /// Variable, coordinate or attribute absent from the dataset
    #[error("Missing from dataset: {0}")]
    Missing(String),

    /// Dataset present but laid out unexpectedly (dimensions, time units)
    #[error("Unexpected dataset layout: {0}")]
    Format(String),

    /// The blocking read task panicked or was cancelled
    #[error("Read task failed: {0}")]
    Task(String),

    /// Retries exhausted for a transient failure
    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<DapError> },
}

impl DapError {
    /// Whether the same request may succeed if repeated.
    pub fn is_transient(&self) -> bool {
        match self {
            DapError::Http { source, .. } => {
                source.is_timeout()
                    || source.is_connect()
                    || source.is_request()
                    || source.is_body()
            }
            DapError::Status { status, .. } => *status >= 500 || *status == 429,
            DapError::NetCdf { source, .. } => is_transient_netcdf(source),
            DapError::RetriesExhausted { .. } => true,
            DapError::Client(_)
            | DapError::NotFound(_)
            | DapError::Server(_)
            | DapError::Missing(_)
            | DapError::Format(_)
            | DapError::Task(_) => false,
        }
    }

    /// Whether the error means "nothing published here".
    pub fn is_not_found(&self) -> bool {
        matches!(self, DapError::NotFound(_) | DapError::Status { status: 404, .. })
    }

    pub fn format(msg: impl Into<String>) -> Self {
        DapError::Format(msg.into())
    }

    pub fn missing(msg: impl Into<String>) -> Self {
        DapError::Missing(msg.into())
    }
}

fn is_transient_netcdf(err: &netcdf::Error) -> bool {
    matches!(err, netcdf::Error::Netcdf(code) if *code == NC_ECURL || *code == NC_EIO)
}
