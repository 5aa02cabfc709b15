mod cli;
mod error;
mod repl;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use cli::Cli;
use error::CliError;
use toolguard_core::AppConfig;
use toolguard_core::agent::{Agent, AgentOptions};
use toolguard_core::model::OllamaClient;
use toolguard_core::tooling::builtin::registry_from_config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", failure_message(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    debug!(config = ?cli.config, model = ?cli.model, "CLI arguments parsed");
    let config = load_config(&cli)?;

    let registry = Arc::new(registry_from_config(&config.tools)?);
    let names: Vec<&str> = registry.names().collect();
    info!(tools = ?names, model = %config.model, "Tool registry ready");
    let provider = OllamaClient::from_config(&config)?;
    let agent = Agent::new(provider, registry, AgentOptions::from_config(&config));

    match cli.prompt() {
        Some(prompt) => {
            let outcome = agent.run(prompt).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.response);
            }
        }
        None => repl::run(&agent).await?,
    }
    info!("toolguard finished");
    Ok(())
}

/// The single stderr line printed when a run fails. Logging stays silent
/// here so `--quiet` and the default filter report a failure the same way.
fn failure_message(err: &CliError) -> String {
    format!("Error: {err}")
}

/// File and environment first, then command line flags on top.
fn load_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::load(cli.config.as_deref().map(Path::new))?;
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(url) = &cli.ollama_url {
        config.endpoint = url.clone();
    }
    if let Some(system) = &cli.system {
        config.system_prompt = Some(system.clone());
    }
    if let Some(max_steps) = cli.max_steps {
        config.guard.max_steps = max_steps;
    }
    if let Some(max_tool_calls) = cli.max_tool_calls {
        config.guard.max_tool_calls = max_tool_calls;
    }
    config.validate()?;
    Ok(config)
}

fn init_tracing(quiet: bool) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = if quiet {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
