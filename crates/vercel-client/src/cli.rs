//! Vercel CLI invocation.
//!
//! The CLI picks the project up from `VERCEL_ORG_ID` / `VERCEL_PROJECT_ID`
//! in its environment, so no `vercel link` step is needed.

use std::process::Stdio;
use std::sync::LazyLock;

use deploy_ports::DeployRequest;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::VercelConfig;
use crate::error::VercelError;
use crate::Result;

/// First `http(s)://` URL in CLI output.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

/// Thin wrapper around the `vercel` executable
pub struct VercelCli {
    config: VercelConfig,
}

impl VercelCli {
    pub fn new(config: VercelConfig) -> Self {
        VercelCli { config }
    }

    /// Deploy the project and return the URL printed by the CLI.
    pub async fn deploy(&self, request: &DeployRequest) -> Result<String> {
        info!(
            production = self.config.production,
            prebuilt = self.config.prebuilt,
            "Deploying with Vercel CLI"
        );
        let stdout = self.run(&self.deploy_args(request)).await?;
        let url = parse_deployment_url(&stdout).ok_or(VercelError::MissingDeploymentUrl)?;
        debug!(url = %url, "Vercel CLI returned deployment URL");
        Ok(url)
    }

    /// `vercel alias set <deployment> <alias>`
    pub async fn assign_alias(&self, deployment_url: &str, alias: &str) -> Result<()> {
        info!(alias = %alias, "Assigning alias");
        self.run(&self.alias_args(deployment_url, alias)).await?;
        Ok(())
    }

    /// Arguments for a deploy invocation.
    pub fn deploy_args(&self, request: &DeployRequest) -> Vec<String> {
        let mut args = vec!["--token".to_string(), self.config.token.clone()];
        if let Some(scope) = &self.config.scope {
            args.push("--scope".to_string());
            args.push(scope.clone());
        }
        if self.config.production {
            args.push("--prod".to_string());
        }
        if self.config.prebuilt {
            args.push("--prebuilt".to_string());
        }
        if self.config.force {
            args.push("--force".to_string());
        }
        if request.commit.is_some() {
            for (key, value) in commit_metadata(request, self.config.trim_commit_message) {
                args.push("--meta".to_string());
                args.push(format!("{}={}", key, value));
            }
        }
        for entry in &self.config.build_env {
            args.push("--build-env".to_string());
            args.push(entry.clone());
        }
        args
    }

    /// Arguments for an alias assignment.
    pub fn alias_args(&self, deployment_url: &str, alias: &str) -> Vec<String> {
        let mut args = vec![
            "--token".to_string(),
            self.config.token.clone(),
            "alias".to_string(),
            "set".to_string(),
            strip_scheme(deployment_url).to_string(),
            strip_scheme(alias).to_string(),
        ];
        if let Some(scope) = &self.config.scope {
            args.push("--scope".to_string());
            args.push(scope.clone());
        }
        args
    }

    async fn run(&self, args: &[String]) -> Result<String> {
        let shown_command = self.display_command(args);
        debug!(command = %shown_command, "Running Vercel CLI");

        let mut command = Command::new(&self.config.cli_path);
        command
            .args(args)
            .env("VERCEL_ORG_ID", &self.config.org_id)
            .env("VERCEL_PROJECT_ID", &self.config.project_id)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.config.working_directory {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VercelError::CliNotFound(self.config.cli_path.clone()),
            _ => VercelError::Io(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(VercelError::CliFailed {
                command: shown_command,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Command line for logs and errors, with the token masked.
    fn display_command(&self, args: &[String]) -> String {
        let masked: Vec<&str> = args
            .iter()
            .map(|a| {
                if *a == self.config.token {
                    "***"
                } else {
                    a.as_str()
                }
            })
            .collect();
        format!("{} {}", self.config.cli_path, masked.join(" "))
    }
}

/// Deployment metadata describing the commit, as `(key, value)` pairs.
///
/// Returns nothing when the request carries no commit metadata.
pub fn commit_metadata(request: &DeployRequest, trim_message: bool) -> Vec<(String, String)> {
    let Some(commit) = &request.commit else {
        return Vec::new();
    };
    let message = if trim_message {
        commit.message.lines().next().unwrap_or_default().to_string()
    } else {
        commit.message.clone()
    };

    let meta = vec![
        ("githubCommitAuthorName", commit.author_name.clone()),
        (
            "githubCommitAuthorLogin",
            commit.author_login.clone().unwrap_or_default(),
        ),
        ("githubCommitMessage", message),
        ("githubCommitOrg", request.owner.clone()),
        ("githubCommitRepo", request.repository.clone()),
        ("githubCommitRef", request.git_ref.clone()),
        ("githubCommitSha", request.sha.clone()),
        ("githubOrg", request.owner.clone()),
        ("githubRepo", request.repository.clone()),
        ("githubDeployment", "1".to_string()),
    ];
    meta.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// First `http(s)://` URL in the CLI output.
pub fn parse_deployment_url(stdout: &str) -> Option<String> {
    URL_RE.find(stdout).map(|m| m.as_str().to_string())
}

fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploy_ports::CommitMetadata;

    fn request(commit: Option<CommitMetadata>) -> DeployRequest {
        DeployRequest {
            commit,
            owner: "acme".to_string(),
            repository: "app".to_string(),
            git_ref: "feature-x".to_string(),
            sha: "abcdef1234567".to_string(),
        }
    }

    fn commit() -> CommitMetadata {
        CommitMetadata {
            author_name: "Jane Doe".to_string(),
            author_login: Some("jdoe".to_string()),
            message: "Fix header\n\nLonger explanation".to_string(),
        }
    }

    #[test]
    fn test_parse_deployment_url_from_cli_output() {
        let stdout = "Vercel CLI 33.0.1\nhttps://app-abc123.vercel.app\n";
        assert_eq!(
            parse_deployment_url(stdout).as_deref(),
            Some("https://app-abc123.vercel.app")
        );
        assert_eq!(parse_deployment_url("Error: no deployment"), None);
    }

    #[test]
    fn test_deploy_args_production_with_scope() {
        let cli = VercelCli::new(VercelConfig {
            production: true,
            ..VercelConfig::new("tok", "team_1", "prj_1").with_scope("acme")
        });
        let args = cli.deploy_args(&request(None));
        assert_eq!(args, vec!["--token", "tok", "--scope", "acme", "--prod"]);
    }

    #[test]
    fn test_deploy_args_include_metadata_and_build_env() {
        let mut config = VercelConfig::new("tok", "team_1", "prj_1");
        config.build_env = vec!["NODE_ENV=production".to_string()];
        let cli = VercelCli::new(config);

        let args = cli.deploy_args(&request(Some(commit())));
        assert!(args
            .windows(2)
            .any(|w| w[0] == "--meta" && w[1] == "githubCommitSha=abcdef1234567"));
        assert!(args
            .windows(2)
            .any(|w| w[0] == "--meta" && w[1] == "githubDeployment=1"));
        assert_eq!(&args[args.len() - 2..], &["--build-env", "NODE_ENV=production"]);
    }

    #[test]
    fn test_commit_metadata_trims_message() {
        let meta = commit_metadata(&request(Some(commit())), true);
        let message = meta
            .iter()
            .find(|(k, _)| k == "githubCommitMessage")
            .map(|(_, v)| v.as_str());
        assert_eq!(message, Some("Fix header"));
        assert!(commit_metadata(&request(None), true).is_empty());
    }

    #[test]
    fn test_alias_args_strip_scheme() {
        let cli = VercelCli::new(VercelConfig::new("tok", "team_1", "prj_1"));
        let args = cli.alias_args("https://app-abc123.vercel.app", "app-42.vercel.app");
        assert_eq!(
            args,
            vec![
                "--token",
                "tok",
                "alias",
                "set",
                "app-abc123.vercel.app",
                "app-42.vercel.app"
            ]
        );
    }

    #[test]
    fn test_display_command_masks_token() {
        let cli = VercelCli::new(VercelConfig::new("secret", "team_1", "prj_1"));
        let shown = cli.display_command(&cli.deploy_args(&request(None)));
        assert!(!shown.contains("secret"));
        assert!(shown.starts_with("vercel --token ***"));
    }

    #[tokio::test]
    async fn test_missing_cli_reports_not_found() {
        let mut config = VercelConfig::new("tok", "team_1", "prj_1");
        config.cli_path = "definitely-not-a-vercel-binary".to_string();
        let cli = VercelCli::new(config);

        let err = cli.deploy(&request(None)).await.unwrap_err();
        assert!(matches!(err, VercelError::CliNotFound(_)));
    }
}
