//! Deploy-Ports: collaborator boundaries for vercel-deploy
//!
//! This crate defines the two narrow capability interfaces the run
//! orchestrator talks to, plus the action-input reader shared by every
//! configuration builder:
//!
//! - `SourceControl`: GitHub deployments, PR comments, labels, commits
//! - `DeployTool`: Vercel deploy, alias assignment, deployment details
//! - `Inputs`: snapshot of the action inputs and runner environment
//!
//! In-memory fakes for both ports live in the `fakes` module.
//!
//! ## Layer 0 - Boundaries
//!
//! Focus: keep the orchestrator testable without network or CLI access.

pub mod error;
pub mod fakes;
pub mod inputs;
pub mod ports;

pub use error::{ConfigError, PortError};
pub use inputs::Inputs;
pub use ports::{
    CommitMetadata, DeployRequest, DeployTool, DeploymentDetails, DeploymentId,
    DeploymentRecord, DeploymentRequest, DeploymentState, DeploymentStatusUpdate, IssueComment,
    PortResult, SourceControl,
};
