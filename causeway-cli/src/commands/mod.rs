//! CLI command implementations

pub mod history;
pub mod import;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use causeway_core::CausewayContext;

/// Get the causeway directory from environment or default
pub fn get_causeway_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CAUSEWAY_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".causeway")
    }
}

/// Get or create causeway context
pub fn get_context() -> Result<CausewayContext> {
    let causeway_dir = get_causeway_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&causeway_dir)
        .with_context(|| format!("Failed to create causeway directory: {:?}", causeway_dir))?;

    CausewayContext::new(&causeway_dir).context("Failed to initialize causeway context")
}
