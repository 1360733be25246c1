//! Error types for the product API client.
//!
//! # Design
//! Errors are classified by where the request failed: no response at all
//! (`Network`, `Timeout`), a 4xx (`Client`), a 5xx (`Server`), or before the
//! request was sent (`Validation`, `Serialization`). The raw status and body
//! are kept so callers can branch on the underlying HTTP status themselves.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `ProductClient` and the transport.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// No response was received.
    #[error("network failure: {0}")]
    Network(String),

    /// No response was received within the configured bound.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a 4xx status.
    #[error("{}", client_message(.status, .detail, .body))]
    Client {
        status: u16,
        body: String,
        detail: Option<String>,
    },

    /// The server answered with a 5xx status.
    #[error("server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    /// The server answered with a status outside the operation's contract.
    #[error("unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request was rejected before it was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Coarse grouping of [`ApiError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkFailure,
    ClientError,
    ServerError,
    Other,
}

impl ApiError {
    /// Classify a non-accepted response status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400..=499 => {
                let detail = extract_detail(&body);
                ApiError::Client {
                    status,
                    body,
                    detail,
                }
            }
            500..=599 => ApiError::Server { status, body },
            _ => ApiError::UnexpectedStatus { status, body },
        }
    }

    /// The HTTP status the server answered with, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) | ApiError::Timeout => ErrorKind::NetworkFailure,
            ApiError::Client { .. } => ErrorKind::ClientError,
            ApiError::Server { .. } => ErrorKind::ServerError,
            _ => ErrorKind::Other,
        }
    }
}

fn client_message(status: &u16, detail: &Option<String>, body: &str) -> String {
    match detail {
        Some(detail) => format!("HTTP {status}: {detail}"),
        None if body.is_empty() => format!("HTTP {status}"),
        None => format!("HTTP {status}: {body}"),
    }
}

/// Pull a human-readable message out of a `{"detail": ...}` error body.
///
/// `detail` is either a string or a list of validation entries each carrying
/// a `msg` (and optionally a `loc` path naming the offending field).
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(entries) => {
            let messages: Vec<String> = entries
                .iter()
                .filter_map(|entry| {
                    let msg = entry.get("msg")?.as_str()?;
                    let field = entry
                        .get("loc")
                        .and_then(Value::as_array)
                        .and_then(|loc| loc.last())
                        .and_then(Value::as_str);
                    Some(match field {
                        Some(field) => format!("{field}: {msg}"),
                        None => msg.to_string(),
                    })
                })
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
