use thiserror::Error;

/// Failure to retrieve a page. Fatal for the run.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            TransportError::Timeout { url }
        } else if err.is_connect() {
            TransportError::Connect { url, source: err }
        } else {
            TransportError::Request { url, source: err }
        }
    }

    /// Timeouts, connection failures and server-side errors may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Timeout { .. } | TransportError::Connect { .. } => true,
            TransportError::Status { status, .. } => *status >= 500,
            TransportError::Request { .. } => false,
        }
    }
}

/// Invalid settings, rejected before extraction starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("months must be a positive number, got {0}")]
    InvalidMonths(i64),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("could not read classifier rules from {path}: {source}")]
    RulesIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("classifier rules in {path} are malformed: {source}")]
    RulesFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("classifier rules are invalid: {0}")]
    InvalidRules(String),
}
