//! Structured observability hooks for the deploy run lifecycle.
//!
//! This module provides:
//! - A run-scoped tracing span carrying repository, ref and PR number
//! - Emission functions for each step of the run: start, fork refusal,
//!   deployment record, comment, alias, finish
//!
//! Events are emitted at `info!` level, problems the run survives at
//! `warn!`. Filtering follows `RUST_LOG`.

use tracing::{info, warn, Span};

use crate::config::RunContext;

/// Span tagging every event of one run.
///
/// Attach it to the run future with `tracing::Instrument`.
pub fn run_span(ctx: &RunContext) -> Span {
    tracing::info_span!(
        "vercel_deploy.run",
        repository = %format!("{}/{}", ctx.owner, ctx.repository),
        git_ref = %ctx.git_ref,
        pr = ctx.pr_number,
    )
}

/// Emit event: run started.
pub fn emit_run_started(ctx: &RunContext) {
    info!(
        event = "run.started",
        branch = %ctx.branch,
        sha = %ctx.short_sha(),
        production = ctx.production,
        pull_request = ctx.is_pull_request(),
    );
}

/// Emit event: forked PR refused (warning level).
pub fn emit_fork_refused(actor: &str) {
    warn!(
        event = "run.fork_refused",
        actor = %actor,
        "PR is from fork and DEPLOY_PR_FROM_FORK is set to false"
    );
}

pub fn emit_deployment_record_created(id: u64, environment: &str) {
    info!(event = "deployment.created", deployment_id = id, environment = %environment);
}

pub fn emit_deployment_status(id: u64, state: &str) {
    info!(event = "deployment.status", deployment_id = id, state = %state);
}

/// Emit event: best-effort status update failed (warning level).
pub fn emit_status_update_failed(id: u64, error: &dyn std::fmt::Display) {
    warn!(event = "deployment.status_failed", deployment_id = id, error = %error);
}

pub fn emit_comment_published(issue: u64, html_url: Option<&str>) {
    info!(
        event = "comment.published",
        issue = issue,
        url = %html_url.unwrap_or("<unknown>"),
    );
}

pub fn emit_alias_assigned(alias: &str) {
    info!(event = "alias.assigned", alias = %alias);
}

/// Emit event: preview alias shortened to fit the branch-URL limit (warning level).
pub fn emit_alias_truncated(prefix: &str, shortened: &str) {
    warn!(
        event = "alias.truncated",
        prefix = %prefix,
        alias = %shortened,
        "alias prefix exceeds 60 chars, truncating using Vercel's branch URL rules"
    );
}

/// Emit event: run finished.
pub fn emit_run_finished(duration_ms: u64, success: bool, urls: usize) {
    info!(
        event = "run.finished",
        duration_ms = duration_ms,
        success = success,
        urls = urls,
    );
}
