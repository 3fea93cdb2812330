use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use bedrock_chat_core::Config;
use tracing_subscriber::EnvFilter;

/// Send tracing output to the log file; the terminal belongs to the UI.
pub fn init(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_new(config.log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("install logger: {err}"))?;

    tracing::info!(log = %path.display(), "logging initialised");
    Ok(())
}

/// Install file logging, or report on stderr and carry on without it.
///
/// Returns whether logging is active. Called before the terminal is taken
/// over, so the report is still visible.
pub fn init_or_report(config: &Config) -> bool {
    match init(config) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("bedrock-chat: continuing without a log file: {err:#}");
            false
        }
    }
}
