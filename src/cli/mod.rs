use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use chainrun::contexts::{AgentRunner, SpecLoader};
use chainrun::data::ModelClient;
use chainrun::providers::OpenAiClient;

mod report;

#[derive(Clone, Copy)]
pub struct Config {
    pub verbose: bool,
}

/// Builds the live model client when a provider key is configured
fn model_client_from_env() -> Result<Option<Box<dyn ModelClient>>> {
    let client = OpenAiClient::from_env().context("Failed to configure model client")?;
    match client {
        Some(client) => {
            info!(base_url = client.base_url(), "using live model provider");
            Ok(Some(Box::new(client)))
        }
        None => {
            info!("no provider key configured, running in mock mode");
            Ok(None)
        }
    }
}

/// Loads the spec, runs it over `input` and prints the result and trace
pub fn run_agent(spec_path: &Path, input: &str, config: &Config) -> Result<()> {
    let client = model_client_from_env()?;
    let runner = AgentRunner::from_path(spec_path, &SpecLoader::default(), client)
        .with_context(|| format!("Failed to prepare agent from {}", spec_path.display()))?;
    info!(
        steps = runner.spec().steps.len(),
        live = runner.is_live(),
        "agent ready"
    );

    let outcome = match runner.run(input) {
        Ok(outcome) => outcome,
        Err(err) => {
            if !err.partial_trace.is_empty() {
                eprintln!("{}", report::render_partial_trace(&err.partial_trace)?);
            }
            return Err(err).context("Agent run failed");
        }
    };

    println!("{}", report::render_outcome(&outcome)?);

    if config.verbose {
        eprintln!("\n{}", report::render_summary(&outcome.trace));
    }

    Ok(())
}
