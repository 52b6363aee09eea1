//! `iwc inspect`: Dump the resolved definition graph.

use clap::Args;
use ironwire_common::types::Identifier;
use ironwire_sdk::builder::ContainerCompiler;

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Resolve only this entry point.
    #[arg(long)]
    pub entry: Option<String>,

    /// Print YAML instead of JSON.
    #[arg(long)]
    pub yaml: bool,
}

/// Executes the `inspect` command.
///
/// # Errors
///
/// Returns an error if resolution or serialization fails.
pub fn execute(compiler: &ContainerCompiler, args: &InspectArgs) -> anyhow::Result<()> {
    let graph = match &args.entry {
        Some(entry) => compiler.resolve_one(&Identifier::new(entry.as_str()))?,
        None => compiler.resolve()?,
    };
    tracing::debug!(definitions = graph.len(), "graph resolved");
    if args.yaml {
        print!("{}", serde_yaml::to_string(&graph)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&graph)?);
    }
    Ok(())
}
