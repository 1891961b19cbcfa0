//! Alias resolution.
//!
//! Turns a domain template such as `{REPO}-{PR}.vercel.app` into the hostname
//! assigned to a deployment. Resolution is a pure function of the template
//! and the [`RunContext`]: repeated runs for the same branch and commit land
//! on the same preview URL.
//!
//! Hostnames under `.vercel.app` follow Vercel's branch-URL rule: a prefix of
//! 60 characters or more is cut to 55 and suffixed with a short fingerprint of
//! branch and repository.

use deploy_ports::ConfigError;
use sha2::{Digest, Sha256};

use crate::config::RunContext;
use crate::obs::emit_alias_truncated;

/// Platform suffix that triggers the prefix length rule
pub const PREVIEW_DOMAIN_SUFFIX: &str = ".vercel.app";
/// Prefixes this long or longer are shortened
pub const MAX_PREFIX_LEN: usize = 60;
/// Length a long prefix is cut to before the fingerprint is appended
pub const TRUNCATED_PREFIX_LEN: usize = 55;
/// Hex characters of the branch fingerprint
pub const FINGERPRINT_LEN: usize = 6;

/// Where an alias template came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasSource {
    /// `PR_PREVIEW_DOMAIN`, used for pull-request runs
    PreviewDomain,
    /// `ALIAS_DOMAINS`, used for every other run
    AliasDomain,
}

/// A resolved hostname ready to be assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub host: String,
    pub source: AliasSource,
}

impl Alias {
    /// Resolve `template` for the given run.
    pub fn resolve(template: &str, ctx: &RunContext, source: AliasSource) -> Self {
        Alias {
            host: resolve_alias(template, ctx),
            source,
        }
    }

    /// The alias as an `https://` URL.
    pub fn url(&self) -> String {
        with_schema(&self.host)
    }
}

/// Replace every character outside `[A-Za-z0-9_~]` with `-`.
pub fn url_safe(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '~' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Substitute placeholders and lowercase, without applying the length rule.
///
/// `{PR}` is only replaced when the run has a pull request; templates that
/// reach a non-PR run are checked for it while building the [`RunContext`].
pub fn substitute(template: &str, ctx: &RunContext) -> String {
    let mut alias = template
        .replace("{USER}", &url_safe(&ctx.owner))
        .replace("{REPO}", &url_safe(&ctx.repository))
        .replace("{BRANCH}", &url_safe(&ctx.branch))
        .replace("{SHA}", ctx.short_sha());
    if let Some(pr) = ctx.pr_number {
        alias = alias.replace("{PR}", &pr.to_string());
    }
    alias.to_lowercase()
}

/// Resolve a template into its final hostname.
pub fn resolve_alias(template: &str, ctx: &RunContext) -> String {
    let alias = substitute(template, ctx);
    shorten_preview_host(&alias, &ctx.branch, &ctx.repository)
}

/// Apply the `.vercel.app` prefix length rule.
pub fn shorten_preview_host(alias: &str, branch: &str, repository: &str) -> String {
    let Some(prefix) = alias.strip_suffix(PREVIEW_DOMAIN_SUFFIX) else {
        return alias.to_string();
    };
    if prefix.chars().count() < MAX_PREFIX_LEN {
        return alias.to_string();
    }

    let kept: String = prefix.chars().take(TRUNCATED_PREFIX_LEN).collect();
    let shortened = format!(
        "{}-{}{}",
        kept,
        branch_fingerprint(branch, repository),
        PREVIEW_DOMAIN_SUFFIX
    );
    emit_alias_truncated(prefix, &shortened);
    shortened
}

/// First six hex characters of `sha256("git-<branch>-<repository>")`.
pub fn branch_fingerprint(branch: &str, repository: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("git-{}-{}", branch, repository).as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

/// Prefix `https://` unless the URL already carries a scheme.
pub fn with_schema(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Reject templates that can never resolve to a hostname.
pub fn validate_template(name: &str, template: &str) -> Result<(), ConfigError> {
    if template.trim().is_empty() {
        return Err(ConfigError::InvalidTemplate {
            name: name.to_string(),
            reason: "empty domain template".to_string(),
        });
    }
    if template.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidTemplate {
            name: name.to_string(),
            reason: format!("domain template contains whitespace: {:?}", template),
        });
    }
    Ok(())
}
