//! Error types for vercel-client

use deploy_ports::PortError;
use thiserror::Error;

/// Errors that can occur talking to Vercel
#[derive(Error, Debug)]
pub enum VercelError {
    /// Vercel CLI could not be started
    #[error("Vercel CLI not found or not executable: {0}")]
    CliNotFound(String),

    /// Vercel CLI exited with a non-zero status
    #[error("Vercel CLI failed ({command}): {stderr}")]
    CliFailed { command: String, stderr: String },

    /// The CLI output did not contain a deployment URL
    #[error("Could not parse deployment URL from Vercel CLI output")]
    MissingDeploymentUrl,

    /// The REST API answered with a non-2xx status
    #[error("Vercel API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The token cannot be sent as an Authorization header
    #[error("Vercel token is not a valid header value")]
    InvalidToken,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for VercelError {
    fn from(err: reqwest::Error) -> Self {
        VercelError::Http(err.to_string())
    }
}

impl From<VercelError> for PortError {
    fn from(err: VercelError) -> Self {
        match err {
            VercelError::CliFailed { command, stderr } => PortError::Command { command, stderr },
            VercelError::Api { status, body } => PortError::Api {
                service: "Vercel",
                status,
                body,
            },
            VercelError::Io(e) => PortError::Io(e),
            VercelError::Json(e) => PortError::Json(e),
            VercelError::Http(msg) => PortError::Request(msg),
            other @ (VercelError::CliNotFound(_) | VercelError::InvalidToken) => {
                PortError::Command {
                    command: "vercel".to_string(),
                    stderr: other.to_string(),
                }
            }
            VercelError::MissingDeploymentUrl => {
                PortError::UnexpectedResponse(VercelError::MissingDeploymentUrl.to_string())
            }
        }
    }
}
