//! `iwc plan`: Show the definitions the container would contain.

use clap::{Args, ValueEnum};
use ironwire_sdk::builder::ContainerCompiler;
use ironwire_sdk::plan::Plan;

use crate::output;

/// Output format of the plan.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlanFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: PlanFormat,
}

/// Executes the `plan` command.
///
/// # Errors
///
/// Returns an error if resolution fails.
pub fn execute(compiler: &ContainerCompiler, args: &PlanArgs) -> anyhow::Result<()> {
    let plan = compiler.plan()?;
    match args.format {
        PlanFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        PlanFormat::Table => print!("{}", render(&plan, compiler.config().container.name.as_str())),
    }
    Ok(())
}

fn render(plan: &Plan, container: &str) -> String {
    let rows: Vec<Vec<String>> = plan
        .entries
        .iter()
        .map(|entry| {
            vec![
                entry.id.to_string(),
                entry.kind.to_owned(),
                entry.scope.to_string(),
                output::flags(&[
                    (entry.entry_point, "entry"),
                    (entry.cached, "cached"),
                    (entry.file_based, "file"),
                    (!entry.method, "included"),
                ]),
                output::format_list(entry.dependencies.iter()),
            ]
        })
        .collect();

    let mut text = format!("Container plan for: {container}\n");
    text.push_str(&output::rule(35));
    text.push_str("\n\n");
    text.push_str(&output::format_table(
        &["IDENTIFIER", "KIND", "SCOPE", "FLAGS", "DEPENDENCIES"],
        &rows,
    ));
    text.push('\n');
    text.push_str("  ");
    text.push_str(&output::pluralize(plan.len(), "definition", "definitions"));
    text.push_str(", ");
    text.push_str(&output::pluralize(plan.entry_points().count(), "entry point", "entry points"));
    text.push('\n');
    text
}
