//! Vercel-Client: deploy tool adapter for vercel-deploy
//!
//! Deployments and alias assignment go through the Vercel CLI, exactly as a
//! developer would run them locally. Deployment details (id, inspector URL)
//! come from the Vercel REST API.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;

pub use api::VercelApi;
pub use cli::{commit_metadata, parse_deployment_url, VercelCli};
pub use config::VercelConfig;
pub use error::VercelError;

use async_trait::async_trait;
use deploy_ports::{DeployRequest, DeployTool, DeploymentDetails, PortResult};

/// Result type for Vercel operations
pub type Result<T> = std::result::Result<T, VercelError>;

/// [`DeployTool`] backed by the Vercel CLI and REST API.
pub struct VercelDeployer {
    cli: VercelCli,
    api: VercelApi,
}

impl VercelDeployer {
    pub fn new(config: VercelConfig) -> Result<Self> {
        let api = VercelApi::new(&config)?;
        Ok(VercelDeployer {
            cli: VercelCli::new(config),
            api,
        })
    }
}

#[async_trait]
impl DeployTool for VercelDeployer {
    async fn deploy(&self, request: &DeployRequest) -> PortResult<String> {
        Ok(self.cli.deploy(request).await?)
    }

    async fn assign_alias(&self, deployment_url: &str, alias: &str) -> PortResult<()> {
        Ok(self.cli.assign_alias(deployment_url, alias).await?)
    }

    async fn deployment_details(&self, deployment_url: &str) -> PortResult<DeploymentDetails> {
        Ok(self.api.deployment(deployment_url).await?)
    }
}
