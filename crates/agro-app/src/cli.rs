//! CLI argument definitions for the crop advisor.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use agro_core::types::CropSelection;

/// Agro - crop advice for cassava, yam and maize, answered from a curated knowledge base.
#[derive(Parser, Debug)]
#[command(name = "agro", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the advisor page and API.
    Serve {
        /// HTTP port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Ask a single question and print the answer.
    Ask {
        /// cassava, yam, maize or all.
        #[arg(long = "crop", value_parser = parse_selection)]
        crop: CropSelection,

        /// Print the answer and its sources as JSON.
        #[arg(long = "json")]
        json: bool,

        /// The question.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// List the selectable crops and their passage counts.
    Crops,
}

fn parse_selection(s: &str) -> Result<CropSelection, String> {
    s.parse::<CropSelection>().map_err(|e| e.to_string())
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > AGRO_CONFIG env var > platform default (~/.agro/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        resolve_config_path_with(self.config.as_ref(), |name| std::env::var(name).ok())
    }

    /// Resolve the HTTP port.
    ///
    /// Priority: --port flag > AGRO_PORT env var > config file value > 8501.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        let flag = match self.command {
            Command::Serve { port } => port,
            _ => None,
        };
        resolve_port_with(flag, config_port, |name| std::env::var(name).ok())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn resolve_config_path_with<F>(flag: Option<&PathBuf>, env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(p) = flag {
        return p.clone();
    }
    if let Some(p) = env("AGRO_CONFIG") {
        return PathBuf::from(p);
    }
    default_config_path(&env)
}

fn resolve_port_with<F>(flag: Option<u16>, config_port: u16, env: F) -> u16
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(p) = flag {
        return p;
    }
    if let Some(p) = env("AGRO_PORT").and_then(|v| v.parse::<u16>().ok()) {
        return p;
    }
    if config_port != 0 {
        return config_port;
    }
    8501
}

/// Default config file path for the current platform.
fn default_config_path<F>(env: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let home_var = if cfg!(target_os = "windows") { "USERPROFILE" } else { "HOME" };
    match env(home_var) {
        Some(home) => PathBuf::from(home).join(".agro").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}
