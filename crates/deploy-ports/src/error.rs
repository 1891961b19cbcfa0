//! Error types for deploy-ports

use thiserror::Error;

/// Errors raised by a collaborator (GitHub or Vercel) behind a port.
#[derive(Error, Debug)]
pub enum PortError {
    /// The request never produced a response (network, DNS, TLS)
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The service answered with a non-2xx status
    #[error("{service} API error ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// An external command exited unsuccessfully
    #[error("command `{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    /// The response could not be interpreted
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while reading the action inputs and runner environment.
///
/// These always surface before any external call is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required input: {0}")]
    Missing(String),

    #[error("input {name} is not a valid boolean: {value}")]
    InvalidBool { name: String, value: String },

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },

    #[error("invalid type for {name}: {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("could not read event payload {path}: {reason}")]
    EventPayload { path: String, reason: String },
}
