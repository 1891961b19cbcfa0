//! In-memory fakes for the collaborator ports (testing only)
//!
//! Provides `MemorySourceControl` and `ScriptedDeployTool` that satisfy the
//! trait contracts without network or CLI access. Both record every call so
//! tests can assert on ordering, and both can be told to fail a given
//! operation.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::PortError;
use crate::ports::*;

// ---------------------------------------------------------------------------
// MemorySourceControl
// ---------------------------------------------------------------------------

/// Operations of [`SourceControl`], used for call logs and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScmOperation {
    CreateDeployment,
    SetDeploymentStatus,
    ListComments,
    DeleteComment,
    CreateComment,
    AddLabels,
    GetCommit,
}

/// A deployment record together with every status it went through.
#[derive(Debug, Clone)]
pub struct FakeDeployment {
    pub record: DeploymentRecord,
    pub request: DeploymentRequest,
    pub statuses: Vec<DeploymentStatusUpdate>,
}

impl FakeDeployment {
    /// Latest state, if any status was set.
    pub fn state(&self) -> Option<DeploymentState> {
        self.statuses.last().map(|s| s.state)
    }
}

#[derive(Debug, Default)]
struct ScmState {
    next_id: u64,
    deployments: Vec<FakeDeployment>,
    comments: Vec<(u64, IssueComment)>,
    labels: BTreeMap<u64, Vec<String>>,
    commit: Option<CommitMetadata>,
    failing: Vec<ScmOperation>,
    calls: Vec<ScmOperation>,
}

/// In-memory source-control service for a single repository.
#[derive(Debug, Default)]
pub struct MemorySourceControl {
    state: Mutex<ScmState>,
}

impl MemorySourceControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit metadata returned by `get_commit`.
    pub fn with_commit(self, commit: CommitMetadata) -> Self {
        self.state.lock().unwrap().commit = Some(commit);
        self
    }

    /// Make every call to `op` fail.
    pub fn failing(self, op: ScmOperation) -> Self {
        self.state.lock().unwrap().failing.push(op);
        self
    }

    /// Insert a pre-existing comment, returning its id.
    pub fn seed_comment(&self, issue_number: u64, body: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        let comment = new_comment(&mut state, issue_number, body);
        let id = comment.id;
        state.comments.push((issue_number, comment));
        id
    }

    /// Live comments on a pull request, oldest first.
    pub fn comments(&self, issue_number: u64) -> Vec<IssueComment> {
        let state = self.state.lock().unwrap();
        state
            .comments
            .iter()
            .filter(|(issue, _)| *issue == issue_number)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn deployments(&self) -> Vec<FakeDeployment> {
        self.state.lock().unwrap().deployments.clone()
    }

    pub fn labels(&self, issue_number: u64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.labels.get(&issue_number).cloned().unwrap_or_default()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ScmOperation> {
        self.state.lock().unwrap().calls.clone()
    }

    fn enter(&self, op: ScmOperation) -> PortResult<std::sync::MutexGuard<'_, ScmState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(PortError::Api {
                service: "GitHub",
                status: 500,
                body: format!("injected failure for {:?}", op),
            });
        }
        Ok(state)
    }
}

fn new_comment(state: &mut ScmState, issue_number: u64, body: &str) -> IssueComment {
    state.next_id += 1;
    IssueComment {
        id: state.next_id,
        body: body.to_string(),
        html_url: Some(format!(
            "https://github.com/fake/fake/pull/{}#issuecomment-{}",
            issue_number, state.next_id
        )),
    }
}

#[async_trait]
impl SourceControl for MemorySourceControl {
    async fn create_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> PortResult<DeploymentRecord> {
        let mut state = self.enter(ScmOperation::CreateDeployment)?;
        state.next_id += 1;
        let record = DeploymentRecord {
            id: DeploymentId(state.next_id),
            environment: request.environment.clone(),
        };
        state.deployments.push(FakeDeployment {
            record: record.clone(),
            request: request.clone(),
            statuses: Vec::new(),
        });
        Ok(record)
    }

    async fn set_deployment_status(
        &self,
        id: DeploymentId,
        update: &DeploymentStatusUpdate,
    ) -> PortResult<()> {
        let mut state = self.enter(ScmOperation::SetDeploymentStatus)?;
        let deployment = state
            .deployments
            .iter_mut()
            .find(|d| d.record.id == id)
            .ok_or_else(|| PortError::Api {
                service: "GitHub",
                status: 404,
                body: format!("deployment {} not found", id),
            })?;
        deployment.statuses.push(update.clone());
        Ok(())
    }

    async fn list_comments(&self, issue_number: u64) -> PortResult<Vec<IssueComment>> {
        let state = self.enter(ScmOperation::ListComments)?;
        Ok(state
            .comments
            .iter()
            .filter(|(issue, _)| *issue == issue_number)
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn delete_comment(&self, comment_id: u64) -> PortResult<()> {
        let mut state = self.enter(ScmOperation::DeleteComment)?;
        let before = state.comments.len();
        state.comments.retain(|(_, c)| c.id != comment_id);
        if state.comments.len() == before {
            return Err(PortError::Api {
                service: "GitHub",
                status: 404,
                body: format!("comment {} not found", comment_id),
            });
        }
        Ok(())
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> PortResult<IssueComment> {
        let mut state = self.enter(ScmOperation::CreateComment)?;
        let comment = new_comment(&mut state, issue_number, body);
        state.comments.push((issue_number, comment.clone()));
        Ok(comment)
    }

    async fn add_labels(&self, issue_number: u64, labels: &[String]) -> PortResult<Vec<String>> {
        let mut state = self.enter(ScmOperation::AddLabels)?;
        let applied = state.labels.entry(issue_number).or_default();
        for label in labels {
            if !applied.contains(label) {
                applied.push(label.clone());
            }
        }
        Ok(applied.clone())
    }

    async fn get_commit(&self, git_ref: &str) -> PortResult<CommitMetadata> {
        let state = self.enter(ScmOperation::GetCommit)?;
        state.commit.clone().ok_or_else(|| PortError::Api {
            service: "GitHub",
            status: 404,
            body: format!("no commit found for ref {}", git_ref),
        })
    }
}

// ---------------------------------------------------------------------------
// ScriptedDeployTool
// ---------------------------------------------------------------------------

/// Operations of [`DeployTool`], used for call logs and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOperation {
    Deploy,
    AssignAlias,
    DeploymentDetails,
}

#[derive(Debug, Default)]
struct DeployState {
    failing: Vec<DeployOperation>,
    calls: Vec<DeployOperation>,
    requests: Vec<DeployRequest>,
    aliases: Vec<(String, String)>,
}

/// Deploy tool that answers with a fixed URL and fixed details.
#[derive(Debug)]
pub struct ScriptedDeployTool {
    deployment_url: String,
    details: DeploymentDetails,
    state: Mutex<DeployState>,
}

impl ScriptedDeployTool {
    pub fn new(deployment_url: &str, details: DeploymentDetails) -> Self {
        ScriptedDeployTool {
            deployment_url: deployment_url.to_string(),
            details,
            state: Mutex::new(DeployState::default()),
        }
    }

    /// Make every call to `op` fail.
    pub fn failing(self, op: DeployOperation) -> Self {
        self.state.lock().unwrap().failing.push(op);
        self
    }

    pub fn calls(&self) -> Vec<DeployOperation> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Requests passed to `deploy`.
    pub fn requests(&self) -> Vec<DeployRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// `(deployment_url, alias)` pairs in assignment order.
    pub fn aliases(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().aliases.clone()
    }

    fn enter(&self, op: DeployOperation) -> PortResult<std::sync::MutexGuard<'_, DeployState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(PortError::Command {
                command: format!("vercel ({:?})", op),
                stderr: "injected failure".to_string(),
            });
        }
        Ok(state)
    }
}

#[async_trait]
impl DeployTool for ScriptedDeployTool {
    async fn deploy(&self, request: &DeployRequest) -> PortResult<String> {
        let mut state = self.enter(DeployOperation::Deploy)?;
        state.requests.push(request.clone());
        Ok(self.deployment_url.clone())
    }

    async fn assign_alias(&self, deployment_url: &str, alias: &str) -> PortResult<()> {
        let mut state = self.enter(DeployOperation::AssignAlias)?;
        state
            .aliases
            .push((deployment_url.to_string(), alias.to_string()));
        Ok(())
    }

    async fn deployment_details(&self, _deployment_url: &str) -> PortResult<DeploymentDetails> {
        let _state = self.enter(DeployOperation::DeploymentDetails)?;
        Ok(self.details.clone())
    }
}
