//! CLI command implementations

pub mod account;
pub mod accounts;
pub mod logs;

use std::path::PathBuf;

use anyhow::{Context, Result};
use lumen_core::{EntryPoint, LumenContext};

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("LUMEN_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".lumen"))
}

/// Open the stores and services
pub fn get_context() -> Result<LumenContext> {
    let data_dir = get_data_dir()?;
    LumenContext::new(&data_dir, EntryPoint::Cli).context("Failed to initialize lumen context")
}
