//! CLI command definitions and dispatch.

pub mod compile;
pub mod inspect;
pub mod plan;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ironwire_sdk::builder::ContainerCompiler;
use ironwire_sdk::loader;

/// ironwire: compile-time dependency-injection container generator.
#[derive(Parser, Debug)]
#[command(name = "iwc", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the compiler configuration file.
    #[arg(long, global = true, env = "IRONWIRE_CONFIG", default_value = ironwire_common::constants::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Path to the type metadata file.
    #[arg(long, global = true, env = "IRONWIRE_METADATA", default_value = ironwire_common::constants::DEFAULT_METADATA_FILE)]
    pub metadata: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the entry points and write the container source.
    Compile(compile::CompileArgs),
    /// Show the definitions the container would contain.
    Plan(plan::PlanArgs),
    /// Dump the resolved definition graph.
    Inspect(inspect::InspectArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let compiler = load(&cli)?;
    match cli.command {
        Command::Compile(args) => compile::execute(compiler, &args),
        Command::Plan(args) => plan::execute(&compiler, &args),
        Command::Inspect(args) => inspect::execute(&compiler, &args),
    }
}

/// Loads the configuration and metadata named on the command line.
fn load(cli: &Cli) -> anyhow::Result<ContainerCompiler> {
    let config = loader::load_config(&cli.config)
        .with_context(|| format!("cannot load configuration {}", cli.config.display()))?;
    let metadata = loader::load_metadata(&cli.metadata)
        .with_context(|| format!("cannot load metadata {}", cli.metadata.display()))?;
    Ok(ContainerCompiler::new(config).metadata(metadata))
}
