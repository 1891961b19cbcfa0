//! Wire types for the GitHub REST endpoints used by the client.
//!
//! Only the fields the deploy run reads are modelled; serde ignores the rest.

use deploy_ports::{CommitMetadata, IssueComment};
use serde::{Deserialize, Serialize};

// ── requests ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateDeploymentBody<'a> {
    #[serde(rename = "ref")]
    pub git_ref: &'a str,
    pub required_contexts: Vec<String>,
    pub environment: &'a str,
    pub description: &'a str,
    pub auto_merge: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateDeploymentStatusBody<'a> {
    pub state: &'a str,
    pub log_url: &'a str,
    pub environment_url: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CommentBody<'a> {
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LabelsBody<'a> {
    pub labels: &'a [String],
}

// ── responses ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeploymentResponse {
    pub id: u64,
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentResponse {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl From<CommentResponse> for IssueComment {
    fn from(c: CommentResponse) -> Self {
        IssueComment {
            id: c.id,
            body: c.body.unwrap_or_default(),
            html_url: c.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LabelResponse {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CommitResponse {
    pub commit: GitCommit,
    /// Linked GitHub account; null when the author email is unknown to GitHub
    #[serde(default)]
    pub author: Option<Account>,
}

#[derive(Debug, Deserialize)]
pub struct GitCommit {
    pub author: GitSignature,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GitSignature {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    pub login: String,
}

impl From<CommitResponse> for CommitMetadata {
    fn from(c: CommitResponse) -> Self {
        CommitMetadata {
            author_name: c.commit.author.name,
            author_login: c.author.map(|a| a.login),
            message: c.commit.message,
        }
    }
}
