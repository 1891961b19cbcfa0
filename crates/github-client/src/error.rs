//! Error types for github-client

use deploy_ports::PortError;
use thiserror::Error;

/// Errors from the GitHub REST layer
#[derive(Error, Debug)]
pub enum GithubError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// GitHub returned a non-2xx status code
    #[error("GitHub API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The token cannot be sent as an Authorization header
    #[error("GitHub token is not a valid header value")]
    InvalidToken,

    /// The payload did not have the expected shape
    #[error("Unexpected GitHub response: {0}")]
    UnexpectedResponse(String),
}

impl From<GithubError> for PortError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::Request(e) => PortError::Request(e.to_string()),
            GithubError::Api { status, body } => PortError::Api {
                service: "GitHub",
                status,
                body,
            },
            GithubError::InvalidToken => PortError::Request(GithubError::InvalidToken.to_string()),
            GithubError::UnexpectedResponse(msg) => PortError::UnexpectedResponse(msg),
        }
    }
}
