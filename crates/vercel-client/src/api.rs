//! Vercel REST API client (deployment lookups only).

use deploy_ports::DeploymentDetails;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::debug;

use crate::config::VercelConfig;
use crate::error::VercelError;
use crate::Result;

/// HTTP client for the Vercel REST API
pub struct VercelApi {
    client: reqwest::Client,
    api_url: String,
    team_id: Option<String>,
}

impl VercelApi {
    pub fn new(config: &VercelConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| VercelError::InvalidToken)?;
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .user_agent(concat!("vercel-deploy/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(VercelApi {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            team_id: config.team_id().map(str::to_string),
        })
    }

    /// URL of the deployment lookup for a deployment host or URL.
    pub fn deployment_url(&self, deployment: &str) -> String {
        let host = deployment
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        match &self.team_id {
            Some(team) => format!("{}/v13/deployments/{}?teamId={}", self.api_url, host, team),
            None => format!("{}/v13/deployments/{}", self.api_url, host),
        }
    }

    /// Fetch id and inspector URL of a deployment.
    pub async fn deployment(&self, deployment: &str) -> Result<DeploymentDetails> {
        let url = self.deployment_url(deployment);
        debug!(url = %url, "Fetching deployment details");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VercelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_url_for_team() {
        let api = VercelApi::new(&VercelConfig::new("tok", "team_abc", "prj_1")).unwrap();
        assert_eq!(
            api.deployment_url("https://app-abc123.vercel.app"),
            "https://api.vercel.com/v13/deployments/app-abc123.vercel.app?teamId=team_abc"
        );
    }

    #[test]
    fn test_deployment_url_for_personal_account() {
        let api = VercelApi::new(&VercelConfig::new("tok", "abc", "prj_1")).unwrap();
        assert_eq!(
            api.deployment_url("app-abc123.vercel.app/"),
            "https://api.vercel.com/v13/deployments/app-abc123.vercel.app"
        );
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = VercelApi::new(&VercelConfig::new("bad\ntoken", "abc", "prj_1"));
        assert!(matches!(result, Err(VercelError::InvalidToken)));
    }
}
