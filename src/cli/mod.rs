//! Command-line entry point for medchat.

pub mod app;
pub mod telemetry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{MedchatConfig, API_KEY_ENV, ENDPOINT_ENV};
use crate::error::MedchatError;
use crate::types::SearchMode;

/// medchat CLI
#[derive(Parser, Debug)]
#[command(
    name = "medchat",
    version,
    about = "Symptom chat over a hosted answer service (demonstration only)"
)]
pub struct Cli {
    /// Service endpoint URL (overrides ORAMA_API_URL)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Service API key (overrides ORAMA_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands. Without one, `chat` runs.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Interactive chat in the terminal
    Chat,
    /// Search the case index directly, printing hits as JSON
    Search(SearchArgs),
}

/// Arguments for `medchat search`.
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Search term
    pub term: String,

    /// Maximum number of hits
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Search mode (vector, fulltext, hybrid)
    #[arg(short, long, default_value = "vector")]
    pub mode: SearchMode,
}

impl Cli {
    /// Environment config with command-line overrides applied.
    pub fn config(&self) -> MedchatConfig {
        let mut config = MedchatConfig::from_env();
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(api_key.clone());
        }
        config
    }

    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }
}

/// Map a [`MedchatError`] to a user-facing help string with actionable guidance.
pub fn format_error_help(err: &MedchatError) -> String {
    match err {
        MedchatError::Configuration(msg) => format!(
            "{msg}. Export {ENDPOINT_ENV} and {API_KEY_ENV}, or pass --endpoint and --api-key"
        ),
        MedchatError::Authentication(msg) => {
            format!("Authentication failed: {msg}. Check {API_KEY_ENV}")
        }
        other => format!("{other}"),
    }
}
