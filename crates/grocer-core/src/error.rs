//! Error types for the Grocer Genie core.

use thiserror::Error;

/// Failure of the outbound call to the assistant endpoint.
///
/// HTTP status codes are not part of this: a non-success response whose body
/// still decodes as JSON is handed to the classifier like any other reply.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read
    #[error("request to assistant endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not JSON
    #[error("assistant reply was not valid JSON: {0}")]
    Decode(String),

    /// The task carrying the request ended before producing a reply
    #[error("request task ended unexpectedly: {0}")]
    Interrupted(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}
