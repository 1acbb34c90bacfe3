#![warn(missing_docs)]
//! Build and inspection tasks for the single-file table viewer.
//!
//! `build` inlines the stylesheet, the script modules, and a validated default configuration
//! into one HTML document. `check` validates a configuration the same way. `resolve` drives
//! the bootstrap resolver headlessly against a real URL.

use std::io;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, registry};

/// Artifact assembly.
pub mod bundle;
/// Configuration validation command.
mod check;
/// Error and result types for `viewer-build`.
mod error;
/// Headless resolver command.
pub mod resolve;
/// Document template.
pub mod template;

pub use bundle::{Artifact, BuildArgs, BuildPlan, DEFAULT_MODULES, assemble, build};
pub use check::CheckArgs;
pub use error::{Error, Result};
pub use resolve::ResolveArgs;

/// Viewer build commands.
#[derive(Debug, Parser)]
#[command(name = "viewer-build", author, version, about)]
struct Cli {
    /// Logging controls.
    #[command(flatten)]
    log: logging::LogArgs,

    /// The command to run.
    #[command(subcommand)]
    command: Command,
}

/// Subcommands for `viewer-build`.
#[derive(Debug, Subcommand)]
enum Command {
    /// Assemble the single-file viewer.
    Build(BuildArgs),
    /// Validate a configuration file.
    Check(CheckArgs),
    /// Run the bootstrap resolver headlessly and print what it chose.
    Resolve(ResolveArgs),
}

/// Execute the `viewer-build` CLI.
pub fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    let env_filter = logging::env_filter_from_spec(&log.spec());
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .try_init()
        .ok();

    match command {
        Command::Build(args) => bundle::build_cmd(&args),
        Command::Check(args) => check::check_cmd(&args),
        Command::Resolve(args) => resolve::resolve_cmd(&args),
    }
}
