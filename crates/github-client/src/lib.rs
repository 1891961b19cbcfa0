//! GitHub-Client: REST adapter for the `SourceControl` port
//!
//! Wraps the handful of GitHub REST endpoints a deploy run touches:
//! deployments and their statuses, pull-request comments, labels and
//! commit lookups. The client is bound to one repository.

pub mod client;
pub mod error;
pub mod models;

pub use client::{GithubClient, GithubConfig};
pub use error::GithubError;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GithubError>;
