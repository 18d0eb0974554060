//! Init command - write a default config file.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config;

pub async fn cmd_init(path: Option<&Path>) -> Result<()> {
    let cfg_path = path.map(PathBuf::from).unwrap_or_else(config::config_path);
    if cfg_path.exists() {
        println!("Config already exists at {}", cfg_path.display());
        println!("Delete it first if you want to re-initialize.");
        return Ok(());
    }

    config::save_config(&config::Config::default(), Some(&cfg_path))?;
    println!("✓ Created config at {}", cfg_path.display());
    println!("\nNext steps:");
    println!("  1. Add your API key to {} (or export {})", cfg_path.display(), config::API_KEY_ENV);
    println!("  2. Chat: grok-cli chat -m \"What files are here?\"");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        cmd_init(Some(&path)).await.unwrap();
        assert_eq!(config::load_config(Some(&path)).unwrap(), config::Config::default());

        std::fs::write(&path, r#"{"provider":{"apiKey":"keep-me"}}"#).unwrap();
        cmd_init(Some(&path)).await.unwrap();
        assert_eq!(config::load_config(Some(&path)).unwrap().provider.api_key, "keep-me");
    }
}
