//! Tools and call commands: inspect and invoke tools without a model.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::tools::{tool_definitions, ToolDefinition};
use anyhow::{Context, Result};
use serde_json::Value;

/// Print every registered tool.
pub fn run_tools() -> Result<()> {
    Output::header("Available tools");
    for tool in tool_definitions() {
        Output::tool(tool.name, tool.description, &param_labels(tool));
    }
    Ok(())
}

/// Dispatch one tool call and print its JSON result.
pub async fn run_call(name: &str, args: &str, settings: Settings) -> Result<()> {
    let arguments: Value =
        serde_json::from_str(args).context("--args must be a JSON object")?;

    let orchestrator = Orchestrator::new(settings)?;
    let result = orchestrator.dispatcher().dispatch(name, arguments).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn param_labels(tool: &ToolDefinition) -> Vec<String> {
    tool.params
        .iter()
        .map(|p| {
            let optional = if p.required { "" } else { "?" };
            format!("{}{}: {}", p.name, optional, p.kind.as_str())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::find_tool;

    #[test]
    fn test_param_labels() {
        let labels = param_labels(find_tool("team_stats").unwrap());
        assert_eq!(labels, ["teamId: integer", "season: string"]);
    }
}
