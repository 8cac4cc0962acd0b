//! Ask command implementation.

use crate::agent::{OpenAIChatModel, Outcome};
use crate::cli::output::preview;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::sync::Arc;

/// Run one question through the resolver and print the answer.
pub async fn run_ask(prompt: &str, model: Option<String>, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let resolver = match model {
        Some(name) => {
            let chat_model = OpenAIChatModel::new(&orchestrator.settings().model)?.with_model(&name);
            orchestrator.resolver_with(Arc::new(chat_model))
        }
        None => orchestrator.resolver(),
    };

    let spinner = Output::spinner("Looking it up...");

    match resolver.resolve(prompt).await {
        Ok(resolution) => {
            spinner.finish_and_clear();

            println!("\n{}\n", resolution.message);

            if resolution.outcome == Outcome::Exhausted {
                Output::warning(&format!(
                    "Gave up after {} model calls.",
                    resolution.steps
                ));
            }

            if !resolution.tool_calls.is_empty() {
                Output::header("Tools used");
                for record in &resolution.tool_calls {
                    Output::list_item(&format!("{} -> {}", record, preview(&record.result, 80)));
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
