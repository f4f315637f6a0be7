use thiserror::Error;

use crate::domain::ColumnDescriptor;

/// Process-level error: a message plus the exit code `main` should return.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Prefix the message with the operation that failed.
    pub fn context(self, what: impl std::fmt::Display) -> Self {
        Self {
            exit_code: self.exit_code,
            message: format!("{what}: {}", self.message),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Schema reconciliation failures.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// Two descriptors in one strict scope share a key but disagree on the paired field.
    #[error("conflicting descriptors for '{key}': '{}' vs '{}'", existing.display_name, incoming.display_name)]
    Conflict {
        key: String,
        existing: ColumnDescriptor,
        incoming: ColumnDescriptor,
    },
}

/// Data-source failures. Normally retried; only surfaced once a bounded
/// retry policy gives up.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("cannot decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// A region handed to a category that does not enumerate it.
    #[error("region '{region}' cannot be queried as {category} ballot boxes")]
    RegionMismatch { category: &'static str, region: String },
    #[error("request to {endpoint} gave up after {attempts} attempts: {last}")]
    Exhausted {
        endpoint: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

/// Schema cache file failures. Never fatal; logged by the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid cache contents: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::new(4, err.to_string())
    }
}
