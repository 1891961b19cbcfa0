//! vercel-deploy - deploy to Vercel from a GitHub Actions step
//!
//! Reads the action inputs and runner environment, deploys with the Vercel
//! CLI, reports back to GitHub and writes the step outputs.
//!
//! ## Flags
//!
//! - `--json`: newline-delimited JSON logs on stderr
//! - `--verbose`: debug logs (also enabled by `RUNNER_DEBUG=1`)
//! - `--event-path`: webhook payload, defaults to `GITHUB_EVENT_PATH`
//! - `--output-file`: outputs file, defaults to `GITHUB_OUTPUT`, stdout when unset

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use deploy_core::telemetry::default_level;
use deploy_core::{init_tracing, ActionOutputs, RunContext, RunOrchestrator, RunOutcome};
use deploy_ports::Inputs;
use github_client::{GithubClient, GithubConfig};
use tracing::info;
use vercel_client::{VercelConfig, VercelDeployer};

#[derive(Parser, Debug)]
#[command(name = "vercel-deploy")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deploy to Vercel and report the result to GitHub", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Webhook event payload of the triggering event
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// File the step outputs are appended to
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let inputs = Inputs::from_env();

    let runner_debug = inputs.env("RUNNER_DEBUG") == Some("1");
    init_tracing(cli.json, default_level(cli.verbose, runner_debug));

    if let Err(err) = run(&cli, inputs).await {
        println!("{}", error_annotation(&err));
        return Err(err);
    }
    Ok(())
}

async fn run(cli: &Cli, inputs: Inputs) -> Result<()> {
    let inputs = match &cli.event_path {
        Some(path) => inputs.with("GITHUB_EVENT_PATH", &path.to_string_lossy()),
        None => inputs,
    };

    let ctx = RunContext::from_inputs(&inputs).context("Invalid action configuration")?;
    let github_config = GithubConfig::from_inputs(&inputs).context("Invalid GitHub configuration")?;
    let vercel_config = VercelConfig::from_inputs(&inputs, ctx.production)
        .context("Invalid Vercel configuration")?;

    let github = GithubClient::new(github_config).context("Failed to build GitHub client")?;
    let vercel = VercelDeployer::new(vercel_config).context("Failed to build Vercel client")?;

    let outcome = RunOrchestrator::new(&ctx, &github, &vercel).run().await?;
    if let RunOutcome::Deployed(summary) = &outcome {
        info!(preview_url = %summary.preview_url, "Deployment ready");
    }

    write_outputs(&outcome.outputs(), cli.output_file.as_deref())?;
    info!("Done");
    Ok(())
}

fn write_outputs(outputs: &ActionOutputs, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => outputs
            .write_to(path)
            .with_context(|| format!("Failed to write outputs to {}", path.display())),
        None => {
            print!("{}", outputs.render());
            Ok(())
        }
    }
}

/// Workflow command marking the step as failed, with the full error chain.
fn error_annotation(err: &anyhow::Error) -> String {
    let message = format!("{:#}", err)
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{}", message)
}
