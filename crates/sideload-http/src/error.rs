//! HTTP query error types

use thiserror::Error;

/// Result type for HTTP query operations
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors talking to an InfluxDB `/query` endpoint
#[derive(Debug, Error)]
pub enum HttpError {
    /// The endpoint URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Connection refused, DNS failure, reset, ...
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// No response within the client timeout
    #[error("Request timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body is not the `{"results": [...]}` shape
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// The server ran the query and reported an error
    #[error("Query failed: {message}")]
    QueryFailed { message: String },

    /// Client settings are unusable
    #[error("Invalid configuration '{key}': {message}")]
    Config { key: String, message: String },
}

impl HttpError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a query failed error
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }
}
