//! Error types for talking to the pool API.

use reqwest::StatusCode;

/// Failure of a single API request.
///
/// None of these are fatal to a page: pollers log them and keep the last
/// good snapshot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection, timeout, or other transport failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: String,
        status: StatusCode,
    },

    /// The body was not the JSON shape we expected.
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
