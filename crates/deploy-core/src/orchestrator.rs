//! Run orchestration.
//!
//! Sequences one deploy run against the two collaborators:
//!
//! ```text
//! fork-check ─┬─ refused ─────────────────────────────────────────────┐
//!             └─ deployment record (pending) → pending comment         │
//!                → deploy → aliases → details → record success         │
//!                → final comment → labels ────────────────────────────┴─ done
//! ```
//!
//! Every call is awaited before the next one starts. Any failure after the
//! deployment record exists marks it `failure` before the error is returned.

use std::time::Instant;

use deploy_ports::{
    DeployRequest, DeployTool, DeploymentId, DeploymentRecord, DeploymentRequest,
    DeploymentState, DeploymentStatusUpdate, SourceControl,
};
use tracing::{info, Instrument};

use crate::alias::{with_schema, Alias, AliasSource};
use crate::comment::{compose_comment, compose_fork_refusal, upsert_comment, DeploymentView};
use crate::config::RunContext;
use crate::error::Result;
use crate::obs::{
    emit_alias_assigned, emit_comment_published, emit_deployment_record_created,
    emit_deployment_status, emit_fork_refused, emit_run_finished, emit_run_started,
    emit_status_update_failed, run_span,
};
use crate::outputs::{self, ActionOutputs};

/// Description of the GitHub deployment record.
pub const DEPLOYMENT_DESCRIPTION: &str = "Deploy to Vercel";
/// Description attached to every status of the record.
pub const STATUS_DESCRIPTION: &str = "Starting deployment to Vercel";

/// Everything a successful deployment produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSummary {
    /// First entry of `urls`
    pub preview_url: String,
    /// Aliases in assignment order, raw deployment URL last
    pub urls: Vec<String>,
    pub aliases: Vec<Alias>,
    /// Vercel deployment id
    pub deployment_id: String,
    pub inspector_url: Option<String>,
    /// GitHub deployment record, when one was created
    pub deployment_record: Option<DeploymentRecord>,
    pub comment_created: bool,
}

impl DeploymentSummary {
    /// Last entry of `urls`: the deployment's own URL.
    pub fn unique_url(&self) -> &str {
        self.urls.last().map(String::as_str).unwrap_or_default()
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Forked PR not deployed; the explanation was posted as a comment
    Refused { comment_id: u64 },
    Deployed(DeploymentSummary),
}

impl RunOutcome {
    pub fn is_refused(&self) -> bool {
        matches!(self, RunOutcome::Refused { .. })
    }

    /// Named outputs for the workflow.
    pub fn outputs(&self) -> ActionOutputs {
        let mut out = ActionOutputs::new();
        match self {
            RunOutcome::Refused { .. } => {
                out.set_flag(outputs::DEPLOYMENT_CREATED, false);
                out.set_flag(outputs::COMMENT_CREATED, true);
            }
            RunOutcome::Deployed(summary) => {
                out.set_text(outputs::PREVIEW_URL, summary.preview_url.clone());
                out.set_list(outputs::DEPLOYMENT_URLS, summary.urls.clone());
                out.set_text(outputs::DEPLOYMENT_UNIQUE_URL, summary.unique_url());
                out.set_text(outputs::DEPLOYMENT_ID, summary.deployment_id.clone());
                out.set_text(
                    outputs::DEPLOYMENT_INSPECTOR_URL,
                    summary.inspector_url.clone().unwrap_or_default(),
                );
                out.set_flag(outputs::DEPLOYMENT_CREATED, true);
                out.set_flag(outputs::COMMENT_CREATED, summary.comment_created);
            }
        }
        out
    }
}

/// Drives a single deploy run.
pub struct RunOrchestrator<'a> {
    ctx: &'a RunContext,
    scm: &'a dyn SourceControl,
    deployer: &'a dyn DeployTool,
}

impl<'a> RunOrchestrator<'a> {
    pub fn new(
        ctx: &'a RunContext,
        scm: &'a dyn SourceControl,
        deployer: &'a dyn DeployTool,
    ) -> Self {
        RunOrchestrator { ctx, scm, deployer }
    }

    /// Run the whole workflow once.
    pub async fn run(&self) -> Result<RunOutcome> {
        let started = Instant::now();
        let result = self.execute().instrument(run_span(self.ctx)).await;

        let urls = match &result {
            Ok(RunOutcome::Deployed(summary)) => summary.urls.len(),
            _ => 0,
        };
        emit_run_finished(started.elapsed().as_millis() as u64, result.is_ok(), urls);
        result
    }

    async fn execute(&self) -> Result<RunOutcome> {
        emit_run_started(self.ctx);

        if self.ctx.refuses_fork() {
            return self.refuse_fork().await;
        }

        let mut record = None;
        match self.deploy(&mut record).await {
            Ok(summary) => {
                info!(
                    deployment_id = %summary.deployment_id,
                    urls = %summary.urls.join(", "),
                    "Deployment available"
                );
                Ok(RunOutcome::Deployed(summary))
            }
            Err(err) => {
                if let Some(record) = &record {
                    self.mark_failed(record.id).await;
                }
                Err(err)
            }
        }
    }

    async fn refuse_fork(&self) -> Result<RunOutcome> {
        emit_fork_refused(&self.ctx.actor);
        // refuses_fork() implies a pull request
        let issue = self.ctx.pr_number.unwrap_or_default();
        let body = compose_fork_refusal(self.ctx);
        let comment = upsert_comment(self.scm, self.ctx, issue, &body).await?;
        emit_comment_published(issue, comment.html_url.as_deref());
        Ok(RunOutcome::Refused {
            comment_id: comment.id,
        })
    }

    /// Steps after the fork check. `record` is filled as soon as the GitHub
    /// deployment exists so the caller can fail it.
    async fn deploy(&self, record: &mut Option<DeploymentRecord>) -> Result<DeploymentSummary> {
        let ctx = self.ctx;

        if ctx.github_deployment {
            info!("Creating GitHub deployment");
            let created = self
                .scm
                .create_deployment(&DeploymentRequest {
                    git_ref: ctx.git_ref.clone(),
                    environment: ctx.deployment_environment(),
                    description: DEPLOYMENT_DESCRIPTION.to_string(),
                })
                .await?;
            emit_deployment_record_created(created.id.0, &created.environment);
            *record = Some(created.clone());
            self.set_status(created.id, DeploymentState::Pending, None)
                .await?;
        }

        self.publish_comment(&DeploymentView::pending()).await?;

        let commit = if ctx.attach_commit_metadata {
            Some(self.scm.get_commit(&ctx.git_ref).await?)
        } else {
            None
        };
        let deployment_url = self
            .deployer
            .deploy(&DeployRequest {
                commit,
                owner: ctx.owner.clone(),
                repository: ctx.repository.clone(),
                git_ref: ctx.git_ref.clone(),
                sha: ctx.sha.clone(),
            })
            .await?;
        info!(url = %deployment_url, "Successfully deployed to Vercel");

        let aliases = self.assign_aliases(&deployment_url).await?;
        let mut urls: Vec<String> = aliases.iter().map(Alias::url).collect();
        urls.push(with_schema(&deployment_url));
        let preview_url = urls[0].clone();

        let details = match self.deployer.deployment_details(&deployment_url).await {
            Ok(details) => details,
            Err(err) => {
                self.publish_comment(&DeploymentView::failed()).await?;
                return Err(err.into());
            }
        };

        if let Some(record) = record.as_ref() {
            self.set_status(record.id, DeploymentState::Success, Some(&preview_url))
                .await?;
        }

        self.publish_comment(&DeploymentView::ready(
            &preview_url,
            details.inspector_url.as_deref(),
        ))
        .await?;

        if let Some(issue) = ctx.pr_number {
            if !ctx.pr_labels.is_empty() {
                let applied = self.scm.add_labels(issue, &ctx.pr_labels).await?;
                info!(labels = %applied.join(", "), "Label(s) added");
            }
        }

        Ok(DeploymentSummary {
            preview_url,
            urls,
            aliases,
            deployment_id: details.id,
            inspector_url: details.inspector_url,
            deployment_record: record.clone(),
            comment_created: ctx.comments_enabled(),
        })
    }

    /// Resolve and assign aliases in configuration order.
    async fn assign_aliases(&self, deployment_url: &str) -> Result<Vec<Alias>> {
        let ctx = self.ctx;
        let aliases: Vec<Alias> = if ctx.is_pull_request() {
            ctx.pr_preview_domain
                .iter()
                .map(|template| Alias::resolve(template, ctx, AliasSource::PreviewDomain))
                .collect()
        } else {
            ctx.alias_domains
                .iter()
                .map(|template| Alias::resolve(template, ctx, AliasSource::AliasDomain))
                .collect()
        };

        for alias in &aliases {
            self.deployer.assign_alias(deployment_url, &alias.host).await?;
            emit_alias_assigned(&alias.host);
        }
        Ok(aliases)
    }

    async fn publish_comment(&self, view: &DeploymentView) -> Result<()> {
        let Some(issue) = self.ctx.pr_number else {
            return Ok(());
        };
        if !self.ctx.create_comment {
            return Ok(());
        }

        let body = compose_comment(view, self.ctx);
        let comment = upsert_comment(self.scm, self.ctx, issue, &body).await?;
        emit_comment_published(issue, comment.html_url.as_deref());
        Ok(())
    }

    async fn set_status(
        &self,
        id: DeploymentId,
        state: DeploymentState,
        environment_url: Option<&str>,
    ) -> Result<()> {
        let update = DeploymentStatusUpdate {
            state,
            log_url: self.ctx.log_url.clone(),
            environment_url: environment_url.map(str::to_string),
            description: STATUS_DESCRIPTION.to_string(),
        };
        self.scm.set_deployment_status(id, &update).await?;
        emit_deployment_status(id.0, state.as_str());
        Ok(())
    }

    /// Best effort: a failure here is logged, and the run reports its own error.
    async fn mark_failed(&self, id: DeploymentId) {
        if let Err(err) = self.set_status(id, DeploymentState::Failure, None).await {
            emit_status_update_failed(id.0, &err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploy_ports::fakes::{MemorySourceControl, ScmOperation, ScriptedDeployTool};
    use deploy_ports::DeploymentDetails;
    use tracing_test::traced_test;

    fn details() -> DeploymentDetails {
        DeploymentDetails {
            id: "dpl_1".to_string(),
            inspector_url: None,
        }
    }

    #[test]
    fn test_unique_url_is_last() {
        let summary = DeploymentSummary {
            preview_url: "https://a.example.com".to_string(),
            urls: vec![
                "https://a.example.com".to_string(),
                "https://app-abc123.vercel.app".to_string(),
            ],
            aliases: Vec::new(),
            deployment_id: "dpl_1".to_string(),
            inspector_url: None,
            deployment_record: None,
            comment_created: false,
        };
        assert_eq!(summary.unique_url(), "https://app-abc123.vercel.app");
    }

    #[test]
    fn test_refused_outputs() {
        let out = RunOutcome::Refused { comment_id: 1 }.outputs();
        assert_eq!(out.flag(outputs::DEPLOYMENT_CREATED), Some(false));
        assert_eq!(out.flag(outputs::COMMENT_CREATED), Some(true));
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn test_push_run_without_record_or_metadata() {
        let mut ctx = RunContext::new("acme", "app", "main", "abcdef1234567");
        ctx.github_deployment = false;
        ctx.attach_commit_metadata = false;
        let scm = MemorySourceControl::new();
        let tool = ScriptedDeployTool::new("app-abc123.vercel.app", details());

        let outcome = RunOrchestrator::new(&ctx, &scm, &tool).run().await.unwrap();

        let RunOutcome::Deployed(summary) = outcome else {
            panic!("expected a deployment");
        };
        assert_eq!(summary.urls, vec!["https://app-abc123.vercel.app"]);
        assert!(summary.deployment_record.is_none());
        assert!(!summary.comment_created);
        assert!(scm.calls().is_empty());
        assert!(tool.requests()[0].commit.is_none());
    }

    #[traced_test]
    #[tokio::test]
    async fn test_fork_refusal_is_logged_as_warning() {
        let mut ctx = RunContext::new("acme", "app", "patch-1", "abcdef1234567").with_pull_request(3);
        ctx.is_fork = true;
        ctx.actor = "outsider".to_string();
        let scm = MemorySourceControl::new();
        let tool = ScriptedDeployTool::new("app-abc123.vercel.app", details());

        RunOrchestrator::new(&ctx, &scm, &tool).run().await.unwrap();

        assert!(logs_contain("run.fork_refused"));
        assert!(logs_contain("outsider"));
        assert!(logs_contain("run.finished"));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_long_preview_alias_logs_truncation() {
        let branch = "renovate/some-very-long-dependency-name-that-keeps-going-and-going";
        let mut ctx = RunContext::new("acme", "app", branch, "abcdef1234567").with_pull_request(5);
        ctx.pr_preview_domain = Some("{REPO}-git-{BRANCH}.vercel.app".to_string());
        ctx.github_deployment = false;
        ctx.create_comment = false;
        ctx.attach_commit_metadata = false;
        let scm = MemorySourceControl::new();
        let tool = ScriptedDeployTool::new("app-abc123.vercel.app", details());

        RunOrchestrator::new(&ctx, &scm, &tool).run().await.unwrap();

        assert!(logs_contain("alias.truncated"));
        assert!(logs_contain("alias.assigned"));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_failed_status_update_logged_not_raised() {
        let ctx = RunContext::new("acme", "app", "main", "abcdef1234567");
        let scm = MemorySourceControl::new().failing(ScmOperation::SetDeploymentStatus);
        let tool = ScriptedDeployTool::new("app-abc123.vercel.app", details());

        let err = RunOrchestrator::new(&ctx, &scm, &tool).run().await.unwrap_err();

        assert!(err.to_string().contains("GitHub API error (500)"));
        assert!(logs_contain("deployment.status_failed"));
    }
}
