//! `iwc compile`: Resolve the entry points and write the container source.

use std::path::PathBuf;

use clap::Args;
use ironwire_common::types::Identifier;
use ironwire_core::resolver::LookupMode;
use ironwire_sdk::builder::ContainerCompiler;
use ironwire_sdk::loader;

use crate::output;

/// Arguments for the `compile` command.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Directory the artifacts are written into.
    #[arg(long, short, default_value = "src/generated")]
    pub out_dir: PathBuf,

    /// Compile only this entry point.
    #[arg(long)]
    pub entry: Option<String>,

    /// Ignore file-based placement and emit every definition inline.
    #[arg(long)]
    pub runtime: bool,
}

/// Executes the `compile` command.
///
/// # Errors
///
/// Returns an error if resolution, emission or writing fails.
pub fn execute(compiler: ContainerCompiler, args: &CompileArgs) -> anyhow::Result<()> {
    let compiler = if args.runtime {
        compiler.mode(LookupMode::Runtime)
    } else {
        compiler
    };
    let compiled = match &args.entry {
        Some(entry) => compiler.compile_one(&Identifier::new(entry.as_str()))?,
        None => compiler.compile()?,
    };
    tracing::info!(artifacts = compiled.len(), out_dir = %args.out_dir.display(), "writing container");

    let written = loader::write_artifacts(&compiled, &args.out_dir)?;
    for path in &written {
        println!("  wrote {}", path.display());
    }
    println!();
    println!("  {}", output::pluralize(written.len(), "artifact", "artifacts"));
    Ok(())
}
