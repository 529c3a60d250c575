//! Crate-level error type.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the client can surface. None of them are retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The response carried an empty `next` cursor: there are no more pages.
    #[error("request missing next page")]
    MissingNextPage,

    /// The `next` cursor was not a `path?query` string or its query did not parse.
    #[error("invalid format for next field")]
    InvalidNextPage,

    /// A timestamp or duration matched none of the accepted representations.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A JSON body did not fit the target structure.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service answered with a non-2xx status.
    #[error("{0}")]
    Api(ApiError),

    /// The HTTP collaborator could not complete the exchange.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    /// A feed slug or user ID contains characters the service rejects.
    #[error("invalid feed: {0}")]
    InvalidFeed(String),

    /// An ID that cannot stand as a URL path segment: empty, `.` or `..`.
    #[error("invalid id: {0:?}")]
    InvalidId(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

/// Error body returned by the service alongside a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub exception: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub exception_fields: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub status_code: u16,
}

impl ApiError {
    /// Build from a raw response. Bodies that are not the service's error
    /// shape are kept verbatim in `detail`.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ApiError>(body) {
            Ok(mut err) => {
                if err.status_code == 0 {
                    err.status_code = status;
                }
                err
            }
            Err(_) => ApiError {
                detail: String::from_utf8_lossy(body).into_owned(),
                status_code: status,
                ..ApiError::default()
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exception.is_empty() {
            write!(f, "HTTP {}: {}", self.status_code, self.detail)
        } else {
            write!(
                f,
                "HTTP {} {} (code {}): {}",
                self.status_code, self.exception, self.code, self.detail
            )
        }
    }
}

impl std::error::Error for ApiError {}
