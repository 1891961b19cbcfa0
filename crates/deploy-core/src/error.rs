//! Error type returned by a deploy run.

use deploy_ports::{ConfigError, PortError};
use thiserror::Error;

/// Result type for deploy runs
pub type Result<T> = std::result::Result<T, DeployError>;

/// Why a run failed.
///
/// A fork refusal is not an error; it ends the run successfully.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Invalid or missing input, raised before any external call
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A GitHub or Vercel call failed
    #[error(transparent)]
    Collaborator(#[from] PortError),
}
