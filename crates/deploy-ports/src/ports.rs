//! Port trait definitions for vercel-deploy
//!
//! These traits define the two collaborator boundaries:
//! - `SourceControl`: deployment records, PR comments, labels, commits
//! - `DeployTool`: deploy, alias assignment, deployment details
//!
//! Both traits are async and transport-agnostic. In-memory fakes are
//! provided for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PortError;

/// Result type for port operations
pub type PortResult<T> = std::result::Result<T, PortError>;

// ---------------------------------------------------------------------------
// SourceControl: GitHub deployments, comments and labels
// ---------------------------------------------------------------------------

/// Identifier GitHub assigns to a deployment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentId(pub u64);

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a deployment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Pending,
    Success,
    Failure,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Pending => "pending",
            DeploymentState::Success => "success",
            DeploymentState::Failure => "failure",
        }
    }
}

impl std::fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for creating a deployment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    /// Git ref being deployed
    pub git_ref: String,
    /// Environment name (e.g. "Production", "Preview")
    pub environment: String,
    /// Human-readable description
    pub description: String,
}

/// A deployment record created on the source-control service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: DeploymentId,
    pub environment: String,
}

/// A status transition for an existing deployment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatusUpdate {
    pub state: DeploymentState,
    /// Link to the workflow run logs
    pub log_url: String,
    /// Link to the deployed environment; the log URL when absent
    pub environment_url: Option<String>,
    pub description: String,
}

/// A comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
    pub html_url: Option<String>,
}

/// Commit metadata attached to a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMetadata {
    pub author_name: String,
    /// GitHub handle of the author; absent for commits not linked to an account
    pub author_login: Option<String>,
    pub message: String,
}

/// Source-control hosting service.
///
/// The implementation is bound to one repository at construction time.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Create a deployment record for `request.git_ref`.
    async fn create_deployment(&self, request: &DeploymentRequest)
        -> PortResult<DeploymentRecord>;

    /// Transition a deployment record to a new state.
    async fn set_deployment_status(
        &self,
        id: DeploymentId,
        update: &DeploymentStatusUpdate,
    ) -> PortResult<()>;

    /// List the comments of a pull request.
    async fn list_comments(&self, issue_number: u64) -> PortResult<Vec<IssueComment>>;

    /// Delete a comment by id.
    async fn delete_comment(&self, comment_id: u64) -> PortResult<()>;

    /// Create a comment on a pull request.
    async fn create_comment(&self, issue_number: u64, body: &str) -> PortResult<IssueComment>;

    /// Add labels to a pull request, returning the label names now applied.
    async fn add_labels(&self, issue_number: u64, labels: &[String]) -> PortResult<Vec<String>>;

    /// Fetch commit metadata for a ref.
    async fn get_commit(&self, git_ref: &str) -> PortResult<CommitMetadata>;
}

// ---------------------------------------------------------------------------
// DeployTool: Vercel deploy invocation
// ---------------------------------------------------------------------------

/// Everything the deploy tool needs to know about the commit being shipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    /// Commit metadata, when attaching it is enabled
    pub commit: Option<CommitMetadata>,
    pub owner: String,
    pub repository: String,
    pub git_ref: String,
    pub sha: String,
}

/// Extended details of a finished deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentDetails {
    /// Platform-assigned deployment id
    pub id: String,
    /// Link to the platform's inspector page
    #[serde(rename = "inspectorUrl")]
    pub inspector_url: Option<String>,
}

/// Hosting platform deploy tool.
#[async_trait]
pub trait DeployTool: Send + Sync {
    /// Deploy the project and return the deployment URL.
    async fn deploy(&self, request: &DeployRequest) -> PortResult<String>;

    /// Point `alias` at the deployment reachable under `deployment_url`.
    async fn assign_alias(&self, deployment_url: &str, alias: &str) -> PortResult<()>;

    /// Fetch id and inspector URL of the deployment under `deployment_url`.
    async fn deployment_details(&self, deployment_url: &str) -> PortResult<DeploymentDetails>;
}
