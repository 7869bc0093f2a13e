#![warn(clippy::pedantic)]

//! # rust-toolchain-action
//!
//! Installs a Rust toolchain with rustup inside a CI job.
//!
//! The toolchain, profile, components and targets come from the command
//! line, from `INPUT_*` variables set by the CI platform, and from a
//! `rust-toolchain.toml` (or `rust-toolchain`) file in the working directory.
//! The file takes precedence over everything else.
//!
//! After installation the versions of `rustc`, `cargo` and `rustup` are
//! published as the step outputs `rustc`, `rustc_hash`, `cargo` and `rustup`.
//!
//! ## Module Structure
//!
//! - [`commands`] - The install flow
//! - [`config`] - Option merging, defaults and the toolchain file
//! - [`rustup`] - rustup invocations, version gates and bootstrap
//! - [`outputs`] - Version reports published as outputs
//! - [`workflow`] - CI inputs, outputs and PATH updates
//! - [`logging`] - `tracing` formatted as workflow commands
//! - [`errors`] - Error type shared by every module
//!
//! ## Examples
//!
//! ```bash
//! rust-toolchain-action --toolchain nightly --components rustfmt,clippy
//! INPUT_TOOLCHAIN=1.75.0 INPUT_TARGETS=wasm32-unknown-unknown rust-toolchain-action
//! ```

mod commands;
mod config;
mod errors;
mod logging;
mod outputs;
mod rustup;
mod workflow;

use anyhow::Result;
use clap::Parser;
use commands::install;
use tracing::error;
use workflow::Workflow;

/// Installs a rustup toolchain for the current CI job.
#[derive(Parser)]
#[command(
    name = "rust-toolchain-action",
    author,
    version,
    about = "Installs a rustup toolchain inside a CI job",
    after_help = "\
INPUTS:
    Every option falls back to the matching INPUT_<NAME> environment variable
    (INPUT_TOOLCHAIN, INPUT_PROFILE, INPUT_COMPONENTS, INPUT_TARGETS,
    INPUT_DEFAULT, INPUT_OVERRIDE, INPUT_FORCE).

TOOLCHAIN FILE:
    rust-toolchain.toml or rust-toolchain in the working directory overrides
    the channel, profile, components and targets given here.

ENVIRONMENT VARIABLES:
    GITHUB_OUTPUT           File receiving the version outputs
    GITHUB_PATH             File receiving PATH additions after a bootstrap
    RUNNER_TEMP             Download directory for rustup-init
    RUST_LOG                Log filter (default: rust_toolchain_action=debug,warn)"
)]
pub struct Cli {
    #[command(flatten)]
    pub install: install::InstallArgs,
}

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Reports a failed run on the job log and returns the exit code.
fn handle_error(e: &anyhow::Error) -> i32 {
    error!("{e:#}");
    1
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let workflow = Workflow::from_env();
    install::execute(&cli.install, &workflow).await
}
