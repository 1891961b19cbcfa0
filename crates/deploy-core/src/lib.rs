//! Deploy-Core: the vercel-deploy run
//!
//! This crate turns a [`RunContext`] into a Vercel deployment reported back
//! to GitHub:
//!
//! - `alias`: domain templates to hostnames, with the `.vercel.app` length rule
//! - `comment`: PR comment bodies and the replace-on-update policy
//! - `orchestrator`: the run state machine over the two collaborator ports
//! - `outputs`: named outputs in `$GITHUB_OUTPUT` format
//!
//! ## Layer 1 - Run
//!
//! Focus: one sequential run, fully testable against the in-memory fakes in
//! `deploy_ports::fakes`.

pub mod alias;
pub mod comment;
pub mod config;
pub mod error;
pub mod obs;
pub mod orchestrator;
pub mod outputs;
pub mod telemetry;

pub use alias::{resolve_alias, Alias, AliasSource};
pub use comment::{compose_comment, compose_fork_refusal, project_marker, DeploymentView};
pub use config::{EventPayload, RunContext};
pub use error::{DeployError, Result};
pub use orchestrator::{DeploymentSummary, RunOrchestrator, RunOutcome};
pub use outputs::{ActionOutputs, OutputValue};
pub use telemetry::init_tracing;
