//! Run context: everything a deploy run knows about itself.
//!
//! Built once at process start from the action inputs and the GitHub runner
//! environment, then passed by reference to every component. Nothing below
//! this module reads the environment.

use std::path::Path;

use deploy_ports::{ConfigError, Inputs};
use serde::Deserialize;

use crate::alias::validate_template;

/// Labels applied to a pull request when `PR_LABELS` is unset.
pub const DEFAULT_PR_LABELS: &[&str] = &["deployed"];

const PULL_REQUEST_EVENTS: &[&str] = &["pull_request", "pull_request_target"];

/// Immutable description of a single deploy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// User who triggered the workflow
    pub actor: String,
    /// Repository owner (user or organisation)
    pub owner: String,
    /// Repository name without the owner
    pub repository: String,
    /// Branch name (head branch for pull requests)
    pub branch: String,
    /// Git ref used for the deployment record and commit lookup
    pub git_ref: String,
    /// Full commit SHA
    pub sha: String,
    /// Pull request number; `None` for push and manual runs
    pub pr_number: Option<u64>,
    /// Pull request head lives in a fork
    pub is_fork: bool,
    pub production: bool,
    /// Alias templates for non-PR runs
    pub alias_domains: Vec<String>,
    /// Alias template for PR runs
    pub pr_preview_domain: Option<String>,
    pub pr_labels: Vec<String>,
    pub comment_title: Option<String>,
    /// Link to the workflow run
    pub log_url: String,
    pub vercel_project_id: String,
    /// Overrides the `Production`/`Preview` environment name
    pub github_deployment_env: Option<String>,
    pub create_comment: bool,
    pub attach_commit_metadata: bool,
    pub delete_existing_comment: bool,
    pub github_deployment: bool,
    pub deploy_pr_from_fork: bool,
}

impl RunContext {
    /// Context for a push run on `branch` with every toggle at its default.
    pub fn new(owner: &str, repository: &str, branch: &str, sha: &str) -> Self {
        RunContext {
            actor: owner.to_string(),
            owner: owner.to_string(),
            repository: repository.to_string(),
            branch: branch.to_string(),
            git_ref: format!("refs/heads/{}", branch),
            sha: sha.to_string(),
            pr_number: None,
            is_fork: false,
            production: true,
            alias_domains: Vec::new(),
            pr_preview_domain: None,
            pr_labels: DEFAULT_PR_LABELS.iter().map(|s| s.to_string()).collect(),
            comment_title: None,
            log_url: format!("https://github.com/{}/{}/actions", owner, repository),
            vercel_project_id: String::new(),
            github_deployment_env: None,
            create_comment: true,
            attach_commit_metadata: true,
            delete_existing_comment: true,
            github_deployment: true,
            deploy_pr_from_fork: false,
        }
    }

    /// Turn the context into a pull-request run for `number`.
    pub fn with_pull_request(mut self, number: u64) -> Self {
        self.pr_number = Some(number);
        self.git_ref = self.branch.clone();
        self.production = false;
        self
    }

    /// Build the context from action inputs, reading the event payload from
    /// `GITHUB_EVENT_PATH` when present.
    pub fn from_inputs(inputs: &Inputs) -> Result<Self, ConfigError> {
        let event = match inputs.env("GITHUB_EVENT_PATH") {
            Some(path) => Some(EventPayload::read(Path::new(path))?),
            None => None,
        };
        Self::from_event(inputs, event.as_ref())
    }

    /// Build the context from action inputs and an already parsed payload.
    pub fn from_event(inputs: &Inputs, event: Option<&EventPayload>) -> Result<Self, ConfigError> {
        let (owner, repository) = inputs.repository()?;
        let full_name = format!("{}/{}", owner, repository);
        let event_name = inputs.env("GITHUB_EVENT_NAME").unwrap_or("push");

        let pull_request = if PULL_REQUEST_EVENTS.contains(&event_name) {
            let pr = event
                .and_then(|e| e.pull_request.as_ref())
                .ok_or_else(|| ConfigError::EventPayload {
                    path: inputs.env("GITHUB_EVENT_PATH").unwrap_or("<unset>").to_string(),
                    reason: format!("{} event without a pull_request object", event_name),
                })?;
            Some(pr)
        } else {
            None
        };

        let (branch, git_ref, sha, pr_number, is_fork) = match pull_request {
            Some(pr) => {
                let is_fork = pr
                    .head
                    .repo
                    .as_ref()
                    .map(|repo| repo.full_name != full_name)
                    .unwrap_or(true);
                (
                    pr.head.git_ref.clone(),
                    pr.head.git_ref.clone(),
                    pr.head.sha.clone(),
                    Some(pr.number),
                    is_fork,
                )
            }
            None => {
                let git_ref = inputs
                    .env("GITHUB_REF")
                    .ok_or_else(|| ConfigError::Missing("GITHUB_REF".to_string()))?;
                let sha = inputs
                    .env("GITHUB_SHA")
                    .ok_or_else(|| ConfigError::Missing("GITHUB_SHA".to_string()))?;
                let branch = git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref);
                (
                    branch.to_string(),
                    git_ref.to_string(),
                    sha.to_string(),
                    None,
                    false,
                )
            }
        };

        let pr_preview_domain = match inputs.input("PR_PREVIEW_DOMAIN") {
            Some(raw) => Some(single_template("PR_PREVIEW_DOMAIN", raw)?),
            None => None,
        };
        let alias_domains = inputs.list("ALIAS_DOMAINS");
        for template in &alias_domains {
            validate_alias_domain(template)?;
        }

        let server = inputs.env("GITHUB_SERVER_URL").unwrap_or("https://github.com");
        let log_url = match inputs.env("GITHUB_RUN_ID") {
            Some(run_id) => format!("{}/{}/actions/runs/{}", server, full_name, run_id),
            None => format!("{}/{}/actions", server, full_name),
        };

        Ok(RunContext {
            actor: inputs.env("GITHUB_ACTOR").unwrap_or(&owner).to_string(),
            branch,
            git_ref,
            sha,
            pr_number,
            is_fork,
            production: inputs.flag("PRODUCTION", pr_number.is_none())?,
            alias_domains,
            pr_preview_domain,
            pr_labels: inputs.list_or("PR_LABELS", DEFAULT_PR_LABELS),
            comment_title: inputs.input("COMMENT_TITLE").map(str::to_string),
            log_url,
            vercel_project_id: inputs.required("VERCEL_PROJECT_ID")?.to_string(),
            github_deployment_env: inputs.input("GITHUB_DEPLOYMENT_ENV").map(str::to_string),
            create_comment: inputs.flag("CREATE_COMMENT", true)?,
            attach_commit_metadata: inputs.flag("ATTACH_COMMIT_METADATA", true)?,
            delete_existing_comment: inputs.flag("DELETE_EXISTING_COMMENT", true)?,
            github_deployment: inputs.flag("GITHUB_DEPLOYMENT", true)?,
            deploy_pr_from_fork: inputs.flag("DEPLOY_PR_FROM_FORK", false)?,
            owner,
            repository,
        })
    }

    pub fn is_pull_request(&self) -> bool {
        self.pr_number.is_some()
    }

    /// A forked PR must not be deployed with this repository's secrets.
    pub fn refuses_fork(&self) -> bool {
        self.is_pull_request() && self.is_fork && !self.deploy_pr_from_fork
    }

    /// PR comments are posted for PR runs with commenting enabled.
    pub fn comments_enabled(&self) -> bool {
        self.is_pull_request() && self.create_comment
    }

    /// Environment name for the deployment record.
    pub fn deployment_environment(&self) -> String {
        match &self.github_deployment_env {
            Some(env) => env.clone(),
            None if self.production => "Production".to_string(),
            None => "Preview".to_string(),
        }
    }

    /// First seven characters of the commit SHA.
    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.sha.len());
        &self.sha[..end]
    }
}

/// `PR_PREVIEW_DOMAIN` takes exactly one template; a list is a type error.
fn single_template(name: &str, raw: &str) -> Result<String, ConfigError> {
    if raw.contains(',') || raw.contains('\n') {
        return Err(ConfigError::InvalidTemplate {
            name: name.to_string(),
            reason: "expected a single domain template, got a list".to_string(),
        });
    }
    validate_template(name, raw)?;
    Ok(raw.to_string())
}

/// `ALIAS_DOMAINS` only applies to runs without a pull request, where `{PR}`
/// has no value and would leave braces in the hostname.
fn validate_alias_domain(template: &str) -> Result<(), ConfigError> {
    validate_template("ALIAS_DOMAINS", template)?;
    if template.to_uppercase().contains("{PR}") {
        return Err(ConfigError::InvalidTemplate {
            name: "ALIAS_DOMAINS".to_string(),
            reason: format!("{{PR}} is only available in PR_PREVIEW_DOMAIN: {:?}", template),
        });
    }
    Ok(())
}

// ── GitHub event payload ──────────────────────────────────────────────────

/// The parts of the webhook payload (`GITHUB_EVENT_PATH`) a run reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    pub head: PullRequestHead,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestHead {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub sha: String,
    /// `null` when the fork has been deleted
    #[serde(default)]
    pub repo: Option<RepositoryPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    pub full_name: String,
}

impl EventPayload {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::EventPayload {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::EventPayload {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
