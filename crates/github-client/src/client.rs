//! GitHub REST client
//!
//! Implements [`SourceControl`] over `reqwest`. Every request carries the
//! workflow token as a bearer credential and pins the REST API version.

use async_trait::async_trait;
use deploy_ports::{
    CommitMetadata, ConfigError, DeploymentId, DeploymentRecord, DeploymentRequest,
    DeploymentStatusUpdate, Inputs, IssueComment, PortResult, SourceControl,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::GithubError;
use crate::models::*;
use crate::Result;

const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// GitHub client configuration
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// REST API base URL (differs on GitHub Enterprise Server)
    pub api_url: String,
    /// Workflow token
    pub token: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl GithubConfig {
    pub fn new(token: &str, owner: &str, repo: &str) -> Self {
        GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    /// Read `GITHUB_TOKEN`, `GITHUB_REPOSITORY` and `GITHUB_API_URL`.
    pub fn from_inputs(inputs: &Inputs) -> std::result::Result<Self, ConfigError> {
        let token = inputs.required("GITHUB_TOKEN")?;
        let (owner, repo) = inputs.repository()?;
        let mut config = GithubConfig::new(token, &owner, &repo);
        if let Some(api_url) = inputs.env("GITHUB_API_URL") {
            config = config.with_api_url(api_url);
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Build a URL below `/repos/{owner}/{repo}`.
    pub fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }
}

/// GitHub REST client bound to one repository
pub struct GithubClient {
    config: GithubConfig,
    http_client: reqwest::Client,
}

impl GithubClient {
    /// Create a new GitHub client
    pub fn new(config: GithubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GithubError::InvalidToken)?;
        headers.insert(AUTHORIZATION, auth);

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("vercel-deploy/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(GithubClient {
            config,
            http_client,
        })
    }

    pub async fn create_deployment(&self, request: &DeploymentRequest) -> Result<DeploymentRecord> {
        let body = CreateDeploymentBody {
            git_ref: &request.git_ref,
            required_contexts: Vec::new(),
            environment: &request.environment,
            description: &request.description,
            auto_merge: false,
        };
        let deployment: DeploymentResponse =
            self.post_json(&self.config.repo_url("deployments"), &body).await?;

        Ok(DeploymentRecord {
            id: DeploymentId(deployment.id),
            environment: deployment
                .environment
                .unwrap_or_else(|| request.environment.clone()),
        })
    }

    pub async fn set_deployment_status(
        &self,
        id: DeploymentId,
        update: &DeploymentStatusUpdate,
    ) -> Result<()> {
        let body = CreateDeploymentStatusBody {
            state: update.state.as_str(),
            log_url: &update.log_url,
            environment_url: update.environment_url.as_deref().unwrap_or(&update.log_url),
            description: &update.description,
        };
        let url = self
            .config
            .repo_url(&format!("deployments/{}/statuses", id));
        let _: serde_json::Value = self.post_json(&url, &body).await?;
        Ok(())
    }

    pub async fn list_comments(&self, issue_number: u64) -> Result<Vec<IssueComment>> {
        let url = self
            .config
            .repo_url(&format!("issues/{}/comments?per_page=100", issue_number));
        debug!(url = %url, "listing comments");
        let response = self.http_client.get(&url).send().await?;
        let comments: Vec<CommentResponse> = Self::parse_response(response).await?;
        Ok(comments.into_iter().map(IssueComment::from).collect())
    }

    pub async fn delete_comment(&self, comment_id: u64) -> Result<()> {
        let url = self
            .config
            .repo_url(&format!("issues/comments/{}", comment_id));
        debug!(url = %url, "deleting comment");
        let response = self.http_client.delete(&url).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    pub async fn create_comment(&self, issue_number: u64, body: &str) -> Result<IssueComment> {
        let url = self
            .config
            .repo_url(&format!("issues/{}/comments", issue_number));
        let comment: CommentResponse = self.post_json(&url, &CommentBody { body }).await?;
        Ok(comment.into())
    }

    pub async fn add_labels(&self, issue_number: u64, labels: &[String]) -> Result<Vec<String>> {
        let url = self
            .config
            .repo_url(&format!("issues/{}/labels", issue_number));
        let applied: Vec<LabelResponse> = self.post_json(&url, &LabelsBody { labels }).await?;
        Ok(applied.into_iter().map(|l| l.name).collect())
    }

    pub async fn get_commit(&self, git_ref: &str) -> Result<CommitMetadata> {
        let url = self.config.repo_url(&format!("commits/{}", git_ref));
        debug!(url = %url, "fetching commit");
        let response = self.http_client.get(&url).send().await?;
        let commit: CommitResponse = Self::parse_response(response).await?;
        Ok(commit.into())
    }

    // ---- private helpers ----

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(url = %url, "POST");
        let response = self.http_client.post(url).json(body).send().await?;
        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code, or turn it into
    /// [`GithubError::Api`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GithubError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GithubError::UnexpectedResponse(e.to_string()))
    }
}

#[async_trait]
impl SourceControl for GithubClient {
    async fn create_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> PortResult<DeploymentRecord> {
        Ok(GithubClient::create_deployment(self, request).await?)
    }

    async fn set_deployment_status(
        &self,
        id: DeploymentId,
        update: &DeploymentStatusUpdate,
    ) -> PortResult<()> {
        Ok(GithubClient::set_deployment_status(self, id, update).await?)
    }

    async fn list_comments(&self, issue_number: u64) -> PortResult<Vec<IssueComment>> {
        Ok(GithubClient::list_comments(self, issue_number).await?)
    }

    async fn delete_comment(&self, comment_id: u64) -> PortResult<()> {
        Ok(GithubClient::delete_comment(self, comment_id).await?)
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> PortResult<IssueComment> {
        Ok(GithubClient::create_comment(self, issue_number, body).await?)
    }

    async fn add_labels(&self, issue_number: u64, labels: &[String]) -> PortResult<Vec<String>> {
        Ok(GithubClient::add_labels(self, issue_number, labels).await?)
    }

    async fn get_commit(&self, git_ref: &str) -> PortResult<CommitMetadata> {
        Ok(GithubClient::get_commit(self, git_ref).await?)
    }
}
