//! Named outputs handed back to the workflow.
//!
//! Values are written in the `$GITHUB_OUTPUT` file format: `name=value` for
//! single-line values, a heredoc block for anything containing a newline.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};

pub const PREVIEW_URL: &str = "PREVIEW_URL";
pub const DEPLOYMENT_URLS: &str = "DEPLOYMENT_URLS";
pub const DEPLOYMENT_UNIQUE_URL: &str = "DEPLOYMENT_UNIQUE_URL";
pub const DEPLOYMENT_ID: &str = "DEPLOYMENT_ID";
pub const DEPLOYMENT_INSPECTOR_URL: &str = "DEPLOYMENT_INSPECTOR_URL";
pub const DEPLOYMENT_CREATED: &str = "DEPLOYMENT_CREATED";
pub const COMMENT_CREATED: &str = "COMMENT_CREATED";

/// A single output value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputValue {
    Text(String),
    Flag(bool),
    /// Rendered as a JSON array
    List(Vec<String>),
}

impl OutputValue {
    pub fn render(&self) -> String {
        match self {
            OutputValue::Text(text) => text.clone(),
            OutputValue::Flag(flag) => flag.to_string(),
            OutputValue::List(items) => serde_json::Value::from(items.clone()).to_string(),
        }
    }
}

/// Ordered set of outputs; setting a name twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutputs {
    entries: Vec<(String, OutputValue)>,
}

impl ActionOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: OutputValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, OutputValue::Text(value.into()));
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.set(name, OutputValue::Flag(value));
    }

    pub fn set_list(&mut self, name: &str, values: Vec<String>) {
        self.set(name, OutputValue::List(values));
    }

    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(OutputValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(OutputValue::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        match self.get(name) {
            Some(OutputValue::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All outputs in `$GITHUB_OUTPUT` format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            let value = value.render();
            if value.contains('\n') || value.contains('\r') {
                let delimiter = heredoc_delimiter(&value);
                out.push_str(&format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"));
            } else {
                out.push_str(&format!("{name}={value}\n"));
            }
        }
        out
    }

    /// Append all outputs to the file at `path`, creating it if needed.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.render().as_bytes())?;
        file.flush()
    }
}

/// Heredoc delimiter derived from the value, so it can never occur inside it.
fn heredoc_delimiter(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let mut suffix = hex::encode(hasher.finalize());
    suffix.truncate(16);
    let mut delimiter = format!("ghadelimiter_{suffix}");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_rendering() {
        let mut outputs = ActionOutputs::new();
        outputs.set_text(PREVIEW_URL, "https://app-42.vercel.app");
        outputs.set_flag(DEPLOYMENT_CREATED, true);
        outputs.set_list(
            DEPLOYMENT_URLS,
            vec![
                "https://app-42.vercel.app".to_string(),
                "https://app-abc123.vercel.app".to_string(),
            ],
        );

        assert_eq!(
            outputs.render(),
            "PREVIEW_URL=https://app-42.vercel.app\n\
             DEPLOYMENT_CREATED=true\n\
             DEPLOYMENT_URLS=[\"https://app-42.vercel.app\",\"https://app-abc123.vercel.app\"]\n"
        );
    }

    #[test]
    fn test_multi_line_value_uses_heredoc() {
        let mut outputs = ActionOutputs::new();
        outputs.set_text("NOTES", "line one\nline two");
        let rendered = outputs.render();

        let first = rendered.lines().next().unwrap();
        let (name, delimiter) = first.split_once("<<").unwrap();
        assert_eq!(name, "NOTES");
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert!(rendered.ends_with(&format!("line two\n{delimiter}\n")));
    }

    #[test]
    fn test_setting_twice_keeps_last_value() {
        let mut outputs = ActionOutputs::new();
        outputs.set_flag(COMMENT_CREATED, false);
        outputs.set_flag(COMMENT_CREATED, true);
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs.flag(COMMENT_CREATED), Some(true));
        assert_eq!(outputs.text(COMMENT_CREATED), None);
    }

    #[test]
    fn test_write_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "EARLIER=1\n").unwrap();

        let mut outputs = ActionOutputs::new();
        outputs.set_text(DEPLOYMENT_ID, "dpl_123");
        outputs.write_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "EARLIER=1\nDEPLOYMENT_ID=dpl_123\n");
    }
}
