/// Error types shared by the distribution and version index code paths
use std::path::PathBuf;

/// Unrecoverable failures surfaced to callers.
///
/// Transient network trouble never shows up here; see [`NetworkFailure`].
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid Maven coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Module {module} of type {kind} does not have a valid Maven identifier")]
    ModuleConfiguration { module: String, kind: String },

    #[error("Distribution declares no servers")]
    EmptyDistribution,

    #[error("Unexpected format for {what}: {value}")]
    FormatChanged { what: String, value: String },

    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("Failure while loading {path:?}: {source}")]
    CorruptCache {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{operation} failed: no remote or local source available ({detail})")]
    FatalUnavailable { operation: String, detail: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub(crate) fn corrupt_cache(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        CoreError::CorruptCache {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// A failed single HTTP request. Logged and turned into a fallback attempt.
#[derive(Debug, thiserror::Error)]
pub enum NetworkFailure {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP error {status}: {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("no response from {url}: {reason}")]
    NoResponse { url: String, reason: String },

    #[error("malformed body from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
    Integrity {
        url: String,
        expected: String,
        actual: String,
    },
}

impl NetworkFailure {
    /// Short category label used in log lines.
    pub fn category(&self) -> &'static str {
        match self {
            NetworkFailure::Timeout { .. } => "timeout",
            NetworkFailure::HttpStatus { .. } => "http-error",
            NetworkFailure::NoResponse { .. } => "no-response",
            NetworkFailure::Parse { .. } => "parse-error",
            NetworkFailure::Integrity { .. } => "integrity",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_configuration_names_module_and_kind() {
        let err = CoreError::ModuleConfiguration {
            module: "bad-id".to_string(),
            kind: "ForgeMod".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bad-id"));
        assert!(msg.contains("ForgeMod"));
    }

    #[test]
    fn network_failure_categories() {
        let timeout = NetworkFailure::Timeout {
            url: "http://x".to_string(),
        };
        let status = NetworkFailure::HttpStatus {
            url: "http://x".to_string(),
            status: 404,
        };
        assert_eq!(timeout.category(), "timeout");
        assert_eq!(status.category(), "http-error");
        assert_eq!(status.to_string(), "HTTP error 404: http://x");
    }
}
