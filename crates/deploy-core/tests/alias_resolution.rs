//! Alias resolution: placeholders, sanitization and the `.vercel.app`
//! length rule.

use deploy_core::alias::{
    branch_fingerprint, resolve_alias, substitute, url_safe, Alias, AliasSource,
    FINGERPRINT_LEN, PREVIEW_DOMAIN_SUFFIX, TRUNCATED_PREFIX_LEN,
};
use deploy_core::RunContext;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn pr_context() -> RunContext {
    RunContext::new("acme", "app", "feature-x", "abcdef1234567").with_pull_request(42)
}

fn push_context(branch: &str) -> RunContext {
    RunContext::new("acme", "app", branch, "abcdef1234567")
}

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

#[test]
fn pr_preview_template_resolves() {
    assert_eq!(
        resolve_alias("{REPO}-{PR}.vercel.app", &pr_context()),
        "app-42.vercel.app"
    );
}

#[test]
fn every_placeholder_is_substituted() {
    let alias = resolve_alias("{USER}-{REPO}-{BRANCH}-{SHA}-{PR}.example.com", &pr_context());
    assert_eq!(alias, "acme-app-feature-x-abcdef1-42.example.com");
}

#[test]
fn repeated_placeholders_are_all_replaced() {
    let alias = resolve_alias("{REPO}.{REPO}.example.com", &pr_context());
    assert_eq!(alias, "app.app.example.com");
}

#[test]
fn pr_placeholder_stays_for_push_runs() {
    let alias = substitute("{BRANCH}-{PR}.example.com", &push_context("main"));
    assert_eq!(alias, "main-{pr}.example.com");
}

#[test]
fn result_is_lowercased() {
    let ctx = RunContext::new("ACME", "App", "Feature/Login", "ABCDEF1234567");
    assert_eq!(
        resolve_alias("{USER}-{REPO}-{BRANCH}-{SHA}.Example.com", &ctx),
        "acme-app-feature-login-abcdef1.example.com"
    );
}

#[test]
fn sanitization_only_touches_unsafe_characters() {
    let input = "Feat/üñí code.v2~beta_1@x";
    let cleaned = url_safe(input);

    assert_eq!(cleaned.chars().count(), input.chars().count());
    for (original, replaced) in input.chars().zip(cleaned.chars()) {
        if original.is_ascii_alphanumeric() || original == '_' || original == '~' {
            assert_eq!(original, replaced);
        } else {
            assert_eq!(replaced, '-');
        }
    }
}

#[test]
fn resolution_is_deterministic() {
    let ctx = push_context("dependabot/npm_and_yarn/ws-8.1");
    let template = "{REPO}-git-{BRANCH}-{USER}.vercel.app";
    assert_eq!(resolve_alias(template, &ctx), resolve_alias(template, &ctx));
}

#[test]
fn alias_url_gets_https_scheme() {
    let alias = Alias::resolve("{REPO}-{PR}.vercel.app", &pr_context(), AliasSource::PreviewDomain);
    assert_eq!(alias.url(), "https://app-42.vercel.app");
    assert_eq!(alias.source, AliasSource::PreviewDomain);
}

// ---------------------------------------------------------------------------
// Length rule
// ---------------------------------------------------------------------------

#[test]
fn long_preview_prefix_is_truncated_with_fingerprint() {
    let branch = "b".repeat(70);
    let ctx = push_context(&branch);

    let alias = resolve_alias("{BRANCH}.vercel.app", &ctx);
    let prefix = alias.strip_suffix(PREVIEW_DOMAIN_SUFFIX).unwrap();

    assert_eq!(prefix.len(), TRUNCATED_PREFIX_LEN + 1 + FINGERPRINT_LEN);
    assert_eq!(&prefix[..TRUNCATED_PREFIX_LEN], &branch[..TRUNCATED_PREFIX_LEN]);
    assert_eq!(&prefix[TRUNCATED_PREFIX_LEN..TRUNCATED_PREFIX_LEN + 1], "-");
    assert_eq!(
        &prefix[TRUNCATED_PREFIX_LEN + 1..],
        branch_fingerprint(&branch, "app")
    );
}

#[test]
fn fingerprint_is_stable_per_branch_and_changes_with_it() {
    let first = resolve_alias("{REPO}-{BRANCH}.vercel.app", &push_context(&"x".repeat(70)));
    let again = resolve_alias("{REPO}-{BRANCH}.vercel.app", &push_context(&"x".repeat(70)));
    assert_eq!(first, again);

    let other_branch = format!("{}y", "x".repeat(69));
    let other = resolve_alias("{REPO}-{BRANCH}.vercel.app", &push_context(&other_branch));
    // both prefixes truncate to the same 55 characters; only the fingerprint differs
    assert_eq!(first[..TRUNCATED_PREFIX_LEN], other[..TRUNCATED_PREFIX_LEN]);
    assert_ne!(first, other);
}

#[test]
fn fingerprint_uses_raw_branch_name() {
    // the fingerprint input is the branch as configured, not the sanitized form
    assert_ne!(
        branch_fingerprint("feature/x", "app"),
        branch_fingerprint("feature-x", "app")
    );
}

#[test]
fn long_custom_domain_is_left_alone() {
    let branch = "c".repeat(70);
    let alias = resolve_alias("{BRANCH}.example.com", &push_context(&branch));
    assert_eq!(alias, format!("{}.example.com", branch));
}
