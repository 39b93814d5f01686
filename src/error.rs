//! # Client Errors
//!
//! Every failure surfaced by [`Worldtides`](crate::Worldtides) is a
//! [`WorldtidesError`]. Callers that only care about the broad category can
//! match on [`WorldtidesError::kind`] instead of the individual variants.
//!
//! | Kind            | Raised when                                              |
//! |-----------------|----------------------------------------------------------|
//! | `Connection`    | timeout, DNS failure, refused/reset connection, non-2xx  |
//! | `Service`       | a 2xx response that is not `application/json`            |
//! | `Validation`    | the body is not JSON or does not match the model         |
//! | `Configuration` | the client was built with an unusable base URL           |
//!
//! Transport and decoding errors keep their underlying cause reachable via
//! [`std::error::Error::source`].

use std::time::Duration;

use thiserror::Error;

/// Broad category of a [`WorldtidesError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Service,
    Validation,
    Configuration,
}

/// Errors that can occur while talking to the WorldTides API.
#[derive(Error, Debug)]
pub enum WorldtidesError {
    /// The exchange did not complete within the request timeout.
    #[error("timeout occurred while connecting to the Worldtides API (after {after:?})")]
    Timeout {
        after: Duration,
        #[source]
        source: tokio::time::error::Elapsed,
    },

    /// Transport-level failure, including non-2xx status codes.
    #[error("error occurred while communicating with the Worldtides API: {0}")]
    Connection(#[source] reqwest::Error),

    /// The server answered successfully but not with JSON.
    #[error("unexpected response from the Worldtides API (Content-Type: {content_type:?})")]
    UnexpectedResponse { content_type: String, body: String },

    /// The body claimed to be JSON but could not be parsed.
    #[error("malformed JSON from the Worldtides API: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The JSON did not match the expected schema.
    #[error("response did not match the expected schema: {0}")]
    Validation(#[source] serde_json::Error),

    #[error("invalid client configuration: {0}")]
    Configuration(String),
}

impl WorldtidesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorldtidesError::Timeout { .. } | WorldtidesError::Connection(_) => {
                ErrorKind::Connection
            }
            WorldtidesError::UnexpectedResponse { .. } => ErrorKind::Service,
            WorldtidesError::MalformedJson(_) | WorldtidesError::Validation(_) => {
                ErrorKind::Validation
            }
            WorldtidesError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    pub fn is_connection(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    /// True only for the client-side deadline, not for timeouts configured
    /// on a caller-supplied `reqwest::Client`.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WorldtidesError::Timeout { .. })
    }
}
