use crate::config::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(config: &Config, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}
