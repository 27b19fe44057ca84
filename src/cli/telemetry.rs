//! Log subscriber setup for the binary.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "MEDCHAT_LOG";

const DEFAULT_DIRECTIVE: &str = "medchat=info";

/// Where log lines go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    /// Append to a file; used while the chat view owns the terminal.
    File(&'a Path),
    Stderr,
    Discard,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(target: LogTarget<'_>) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_target(true);

    // try_init only fails when a subscriber is already installed.
    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        LogTarget::Stderr => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
        LogTarget::Discard => {}
    }
    Ok(())
}
