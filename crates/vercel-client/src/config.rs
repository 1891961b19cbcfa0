//! Vercel configuration

use std::path::PathBuf;

use deploy_ports::{ConfigError, Inputs};

/// Vercel configuration
#[derive(Debug, Clone)]
pub struct VercelConfig {
    /// API token, passed to both the CLI and the REST API
    pub token: String,
    /// Team or personal account id (`VERCEL_ORG_ID`)
    pub org_id: String,
    /// Project id (`VERCEL_PROJECT_ID`)
    pub project_id: String,
    /// Team slug passed as `--scope`
    pub scope: Option<String>,
    /// Deploy to production (`--prod`)
    pub production: bool,
    /// Deploy a prebuilt `.vercel/output` (`--prebuilt`)
    pub prebuilt: bool,
    /// Skip the build cache (`--force`)
    pub force: bool,
    /// Directory the CLI runs in
    pub working_directory: Option<PathBuf>,
    /// `KEY=VALUE` pairs forwarded as `--build-env`
    pub build_env: Vec<String>,
    /// Keep only the first line of the commit message in metadata
    pub trim_commit_message: bool,
    /// Executable name or path of the CLI
    pub cli_path: String,
    /// REST API base URL
    pub api_url: String,
}

impl VercelConfig {
    /// Create config with the required credentials and defaults for the rest
    pub fn new(token: &str, org_id: &str, project_id: &str) -> Self {
        VercelConfig {
            token: token.to_string(),
            org_id: org_id.to_string(),
            project_id: project_id.to_string(),
            scope: None,
            production: false,
            prebuilt: false,
            force: false,
            working_directory: None,
            build_env: Vec::new(),
            trim_commit_message: false,
            cli_path: "vercel".to_string(),
            api_url: "https://api.vercel.com".to_string(),
        }
    }

    /// Read the Vercel inputs. `production` is decided by the caller since
    /// its default depends on whether the run is for a pull request.
    pub fn from_inputs(inputs: &Inputs, production: bool) -> Result<Self, ConfigError> {
        let mut config = VercelConfig::new(
            inputs.required("VERCEL_TOKEN")?,
            inputs.required("VERCEL_ORG_ID")?,
            inputs.required("VERCEL_PROJECT_ID")?,
        );
        config.scope = inputs.input("VERCEL_SCOPE").map(str::to_string);
        config.production = production;
        config.prebuilt = inputs.flag("PREBUILT", false)?;
        config.force = inputs.flag("FORCE", false)?;
        config.working_directory = inputs.input("WORKING_DIRECTORY").map(PathBuf::from);
        config.build_env = inputs.list("BUILD_ENV");
        config.trim_commit_message = inputs.flag("TRIM_COMMIT_MESSAGE", false)?;
        if let Some(cli) = inputs.input("VERCEL_CLI") {
            config.cli_path = cli.to_string();
        }
        Ok(config)
    }

    /// Set the team scope
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    /// Team id for REST calls; personal accounts have none.
    pub fn team_id(&self) -> Option<&str> {
        Some(self.org_id.as_str()).filter(|id| id.starts_with("team_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> Inputs {
        Inputs::default()
            .with("INPUT_VERCEL_TOKEN", "tok")
            .with("INPUT_VERCEL_ORG_ID", "team_123")
            .with("INPUT_VERCEL_PROJECT_ID", "prj_456")
    }

    #[test]
    fn test_vercel_config_from_inputs_defaults() {
        let config = VercelConfig::from_inputs(&base_inputs(), true).unwrap();
        assert!(config.production);
        assert!(!config.prebuilt);
        assert!(config.build_env.is_empty());
        assert_eq!(config.cli_path, "vercel");
        assert_eq!(config.scope, None);
    }

    #[test]
    fn test_vercel_config_reads_optional_inputs() {
        let inputs = base_inputs()
            .with("INPUT_VERCEL_SCOPE", "acme")
            .with("INPUT_PREBUILT", "true")
            .with("INPUT_BUILD_ENV", "NODE_ENV=production\nAPI=https://api.example.com")
            .with("INPUT_WORKING_DIRECTORY", "web");

        let config = VercelConfig::from_inputs(&inputs, false).unwrap();
        assert_eq!(config.scope.as_deref(), Some("acme"));
        assert!(config.prebuilt);
        assert_eq!(config.build_env.len(), 2);
        assert_eq!(config.working_directory, Some(PathBuf::from("web")));
    }

    #[test]
    fn test_vercel_config_requires_token() {
        let inputs = Inputs::default()
            .with("INPUT_VERCEL_ORG_ID", "team_123")
            .with("INPUT_VERCEL_PROJECT_ID", "prj_456");
        assert!(matches!(
            VercelConfig::from_inputs(&inputs, false),
            Err(ConfigError::Missing(name)) if name == "VERCEL_TOKEN"
        ));
    }

    #[test]
    fn test_team_id_only_for_team_accounts() {
        assert_eq!(VercelConfig::new("t", "team_1", "p").team_id(), Some("team_1"));
        assert_eq!(VercelConfig::new("t", "user_1", "p").team_id(), None);
    }
}
