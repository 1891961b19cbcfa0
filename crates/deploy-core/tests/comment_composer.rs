//! PR comment bodies and the replace-on-update policy.

use deploy_core::comment::{
    compose_comment, compose_fork_refusal, project_marker, upsert_comment, DeploymentView,
};
use deploy_core::RunContext;
use deploy_ports::fakes::{MemorySourceControl, ScmOperation};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PR: u64 = 42;

fn context(project_id: &str) -> RunContext {
    let mut ctx =
        RunContext::new("acme", "app", "feature-x", "abcdef1234567").with_pull_request(PR);
    ctx.vercel_project_id = project_id.to_string();
    ctx.log_url = "https://github.com/acme/app/actions/runs/1".to_string();
    ctx
}

fn marked(scm: &MemorySourceControl, project_id: &str) -> usize {
    let marker = project_marker(project_id);
    scm.comments(PR)
        .iter()
        .filter(|c| c.body.contains(&marker))
        .count()
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

#[test]
fn body_is_deterministic() {
    let ctx = context("prj_1");
    let view = DeploymentView::ready("https://app-42.vercel.app", Some("https://vercel.com/i"));
    assert_eq!(compose_comment(&view, &ctx), compose_comment(&view, &ctx));
}

#[test]
fn ready_state_links_both_urls() {
    let ctx = context("prj_1");
    let view = DeploymentView::ready(
        "https://app-42.vercel.app",
        Some("https://vercel.com/acme/app/dpl_1"),
    );
    let body = compose_comment(&view, &ctx);

    assert!(body.contains("✅ Preview:"));
    assert!(body.contains("href='https://app-42.vercel.app'"));
    assert!(body.contains("href='https://vercel.com/acme/app/dpl_1'"));
    assert!(!body.contains("*Pending*"));
    assert!(!body.contains("*Error*"));
}

#[test]
fn failed_state_shows_error_twice() {
    let body = compose_comment(&DeploymentView::failed(), &context("prj_1"));
    assert!(body.contains("🔴 Preview:"));
    assert_eq!(body.matches("*Error*").count(), 2);
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_publishing_keeps_one_comment_per_project() {
    let scm = MemorySourceControl::new();
    let ctx = context("prj_1");

    for view in [
        DeploymentView::pending(),
        DeploymentView::ready("https://app-42.vercel.app", None),
        DeploymentView::failed(),
    ] {
        let body = compose_comment(&view, &ctx);
        upsert_comment(&scm, &ctx, PR, &body).await.unwrap();
        assert_eq!(marked(&scm, "prj_1"), 1);
    }

    let live = scm.comments(PR);
    assert_eq!(live.len(), 1);
    assert!(live[0].body.contains("🔴 Preview:"));
}

#[tokio::test]
async fn other_projects_and_human_comments_survive() {
    let scm = MemorySourceControl::new();
    let human = scm.seed_comment(PR, "Looks good to me");
    let docs = scm.seed_comment(PR, &compose_comment(&DeploymentView::pending(), &context("prj_docs")));

    let ctx = context("prj_web");
    upsert_comment(&scm, &ctx, PR, &compose_comment(&DeploymentView::pending(), &ctx))
        .await
        .unwrap();
    upsert_comment(&scm, &ctx, PR, &compose_comment(&DeploymentView::pending(), &ctx))
        .await
        .unwrap();

    let ids: Vec<u64> = scm.comments(PR).iter().map(|c| c.id).collect();
    assert!(ids.contains(&human));
    assert!(ids.contains(&docs));
    assert_eq!(marked(&scm, "prj_web"), 1);
    assert_eq!(marked(&scm, "prj_docs"), 1);
}

#[tokio::test]
async fn disabled_replacement_appends_comments() {
    let scm = MemorySourceControl::new();
    let mut ctx = context("prj_1");
    ctx.delete_existing_comment = false;

    let body = compose_comment(&DeploymentView::pending(), &ctx);
    upsert_comment(&scm, &ctx, PR, &body).await.unwrap();
    upsert_comment(&scm, &ctx, PR, &body).await.unwrap();

    assert_eq!(marked(&scm, "prj_1"), 2);
    assert!(!scm.calls().contains(&ScmOperation::ListComments));
}

#[tokio::test]
async fn refusal_comment_replaces_earlier_refusal() {
    let scm = MemorySourceControl::new();
    let mut ctx = context("prj_1");
    ctx.actor = "outsider".to_string();

    let body = compose_fork_refusal(&ctx);
    upsert_comment(&scm, &ctx, PR, &body).await.unwrap();
    upsert_comment(&scm, &ctx, PR, &body).await.unwrap();

    let live = scm.comments(PR);
    assert_eq!(live.len(), 1);
    assert!(live[0].body.contains("DEPLOY_PR_FROM_FORK"));
}

#[tokio::test]
async fn listing_failure_propagates() {
    let scm = MemorySourceControl::new().failing(ScmOperation::ListComments);
    let ctx = context("prj_1");
    let body = compose_comment(&DeploymentView::pending(), &ctx);

    assert!(upsert_comment(&scm, &ctx, PR, &body).await.is_err());
    assert!(scm.comments(PR).is_empty());
}
