//! Agro application binary - composition root.
//!
//! 1. Parse the CLI and load configuration from TOML
//! 2. Resolve credentials (fatal in generative mode when missing)
//! 3. Embed the knowledge base into per-crop indexes
//! 4. Serve the page and API, answer one question, or list crops

mod bootstrap;
mod cli;

use clap::Parser;

use agro_api::{start_server, AppState};
use agro_chat::SessionState;
use agro_core::config::AgroConfig;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let config = AgroConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG overrides the configured level.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting agro v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let advisor = match bootstrap::start(&config).await {
        Ok(advisor) => advisor,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Serve { .. } => {
            let port = args.resolve_port(config.general.port);
            let state = AppState::new(config, advisor);
            tracing::info!("Advisor page at http://127.0.0.1:{}/", port);
            start_server(port, state).await?;
        }
        Command::Ask {
            crop,
            json,
            ref question,
        } => {
            let session = advisor.select_crop(&SessionState::new(), crop);
            let interaction = advisor.ask(&session, &question.join(" ")).await?;
            match interaction.answer {
                Some(answer) if json => println!("{}", serde_json::to_string_pretty(&answer)?),
                Some(answer) => {
                    println!("{}", answer.text);
                    for source in &answer.sources {
                        tracing::debug!(source = %source.source_tag, score = source.score, "Source");
                    }
                }
                None => tracing::warn!("Question was blank; nothing to answer"),
            }
        }
        Command::Crops => {
            for (selection, passages) in advisor.indexes().sizes() {
                println!("{:<8} {:<10} {} passages", selection.as_str(), selection.label(), passages);
            }
        }
    }

    Ok(())
}
