pub mod index;
pub mod recall;
pub mod record;
pub mod status;

use ainpc_store::config::Config;
use ainpc_store::embeddings::LazyProvider;
use ainpc_store::NpcMemory;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Load the configuration and open the store it points at
///
/// The embedding provider is only built once a command embeds something.
pub fn open_memory(config_path: Option<&Path>) -> Result<NpcMemory> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);
    let config = Config::load(&path)?;

    let embedder = Arc::new(LazyProvider::new(config.embeddings.clone()));
    let memory = NpcMemory::open(&config, embedder)
        .with_context(|| format!("Failed to open database: {}", config.database.path().display()))?;
    Ok(memory)
}

/// Combine a command's outcome with closing the store; the command's own error wins
pub fn finish(result: Result<()>, shutdown: ainpc_store::Result<()>) -> Result<()> {
    result?;
    shutdown.context("Failed to close database")
}
