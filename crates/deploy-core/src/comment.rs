//! Pull-request comment composition and publishing.
//!
//! Every comment starts with an HTML marker carrying the Vercel project id.
//! Publishing looks for an earlier comment with the same marker and replaces
//! it, so a PR holds at most one live comment per project.

use std::sync::LazyLock;

use deploy_ports::{IssueComment, PortResult, SourceControl};
use regex::Regex;
use tracing::info;

use crate::config::RunContext;

/// Leading run of non-newline whitespace on each line.
static INDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]+").expect("valid regex"));

const FORK_DOCS_URL: &str =
    "https://github.com/BetaHuhn/deploy-to-vercel-action#deploying-a-pr-made-from-a-fork-or-dependabot";

/// What the comment reports about the deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentView {
    pub preview_url: Option<String>,
    pub inspect_url: Option<String>,
    pub error: bool,
}

impl DeploymentView {
    /// Deployment started, nothing known yet.
    pub fn pending() -> Self {
        Self::default()
    }

    /// Deployment failed.
    pub fn failed() -> Self {
        DeploymentView {
            error: true,
            ..Self::default()
        }
    }

    /// Deployment finished.
    pub fn ready(preview_url: &str, inspect_url: Option<&str>) -> Self {
        DeploymentView {
            preview_url: Some(preview_url.to_string()),
            inspect_url: inspect_url.map(str::to_string),
            error: false,
        }
    }
}

/// Invisible marker tying a comment to a Vercel project.
pub fn project_marker(project_id: &str) -> String {
    format!("<!-- vercel-deployment-project-id: {} -->", project_id)
}

/// Remove the leading run of non-newline whitespace from every line.
///
/// Markdown renders indented lines as code blocks.
pub fn strip_indentation(body: &str) -> String {
    INDENT_RE.replace_all(body, "").into_owned()
}

fn finish(ctx: &RunContext, body: &str) -> String {
    let body = strip_indentation(body);
    format!(
        "{}\n{}\n",
        project_marker(&ctx.vercel_project_id),
        body.trim_matches('\n')
    )
}

fn link(url: &str) -> String {
    format!("<a target='_blank' href='{url}'>{url}</a>")
}

/// Comment body describing the current deployment state.
pub fn compose_comment(view: &DeploymentView, ctx: &RunContext) -> String {
    let title = match &ctx.comment_title {
        Some(title) => format!("## {}\n\n", title),
        None => String::new(),
    };

    let (glyph, preview) = match (view.error, &view.preview_url) {
        (true, _) => ("🔴", "*Error*".to_string()),
        (false, Some(url)) => ("✅", link(url)),
        (false, None) => ("🟨", "*Pending*".to_string()),
    };
    let inspect = match (view.error, &view.inspect_url) {
        (true, _) => "*Error*".to_string(),
        (false, Some(url)) => link(url),
        (false, None) => "*Pending*".to_string(),
    };

    let body = format!(
        "
        {title}This pull request is being deployed to Vercel.

        <table>
            <tr>
                <td><strong>Latest commit:</strong></td>
                <td><code>{sha}</code></td>
            </tr>
            <tr>
                <td><strong>{glyph} Preview:</strong></td>
                <td>{preview}</td>
            </tr>
            <tr>
                <td><strong>🔍 Inspect:</strong></td>
                <td>{inspect}</td>
            </tr>
        </table>

        [View Workflow Logs]({log_url})
        ",
        sha = ctx.short_sha(),
        log_url = ctx.log_url,
    );

    finish(ctx, &body)
}

/// Comment body explaining why a forked PR was not deployed.
pub fn compose_fork_refusal(ctx: &RunContext) -> String {
    let body = format!(
        "
        Refusing to deploy this Pull Request to Vercel because it originates from @{actor}'s fork.

        **@{owner}** To allow this behaviour set `DEPLOY_PR_FROM_FORK` to true ([more info]({FORK_DOCS_URL})).
        ",
        actor = ctx.actor,
        owner = ctx.owner,
    );

    finish(ctx, &body)
}

/// Publish `body` on the pull request, replacing this project's previous
/// comment when `delete_existing_comment` is set.
pub async fn upsert_comment(
    scm: &dyn SourceControl,
    ctx: &RunContext,
    issue_number: u64,
    body: &str,
) -> PortResult<IssueComment> {
    if ctx.delete_existing_comment {
        let marker = project_marker(&ctx.vercel_project_id);
        let existing = scm.list_comments(issue_number).await?;
        if let Some(previous) = existing.iter().find(|c| c.body.contains(&marker)) {
            scm.delete_comment(previous.id).await?;
            info!(comment_id = previous.id, "Deleted existing comment");
        }
    }

    scm.create_comment(issue_number, body).await
}
