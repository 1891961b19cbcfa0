//! Action inputs and runner environment.
//!
//! GitHub Actions exposes step inputs as `INPUT_<NAME>` variables. Every
//! lookup here prefers that form and falls back to the bare `<NAME>`, so the
//! binary can also be driven by plain environment variables outside Actions.

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Immutable snapshot of the process environment.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    vars: BTreeMap<String, String>,
}

impl Inputs {
    /// Snapshot the current process environment.
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Build from explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Inputs {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add or replace a variable.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Raw runner variable (e.g. `GITHUB_SHA`). Empty values count as unset.
    pub fn env(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Action input, trimmed. Empty values count as unset.
    pub fn input(&self, name: &str) -> Option<&str> {
        let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
        self.vars
            .get(&key)
            .or_else(|| self.vars.get(name))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> Result<&str, ConfigError> {
        self.input(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    /// Boolean input; `default` applies when the input is unset.
    pub fn flag(&self, name: &str, default: bool) -> Result<bool, ConfigError> {
        match self.input(name) {
            None => Ok(default),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            },
        }
    }

    /// `GITHUB_REPOSITORY` split into `(owner, repo)`.
    pub fn repository(&self) -> Result<(String, String), ConfigError> {
        let full = self
            .env("GITHUB_REPOSITORY")
            .ok_or_else(|| ConfigError::Missing("GITHUB_REPOSITORY".to_string()))?;
        match full.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
                Ok((owner.to_string(), repo.to_string()))
            }
            _ => Err(ConfigError::Invalid {
                name: "GITHUB_REPOSITORY".to_string(),
                reason: format!("expected owner/repo, got {}", full),
            }),
        }
    }

    /// List input split on commas and newlines.
    ///
    /// The literal value `false` disables the list entirely.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.input(name) {
            None => Vec::new(),
            Some(value) => split_list(value),
        }
    }

    /// Like [`Inputs::list`] but with a default for the unset case.
    pub fn list_or(&self, name: &str, default: &[&str]) -> Vec<String> {
        match self.input(name) {
            None => default.iter().map(|s| s.to_string()).collect(),
            Some(value) => split_list(value),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    if value.eq_ignore_ascii_case("false") {
        return Vec::new();
    }
    value
        .split(|c: char| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
