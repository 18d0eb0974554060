use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::agent::context::DEFAULT_SYSTEM_PROMPT;
use crate::rig_provider::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_PROVIDER};

/// Environment variable consulted when the config file carries no API key.
pub const API_KEY_ENV: &str = "XAI_API_KEY";

// ---------------------------------------------------------------------------
// Provider config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default = "default_provider")]
    pub name: String,
    #[serde(default)]
    pub api_key: String,
    pub api_base: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider(),
            api_key: String::new(),
            api_base: Some(DEFAULT_API_BASE.into()),
            model: default_model(),
        }
    }
}

// ---------------------------------------------------------------------------
// Agent settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_max_tool_output_bytes")]
    pub max_tool_output_bytes: usize,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u64 {
    1000
}
fn default_max_iterations() -> u32 {
    10
}
fn default_max_tool_output_bytes() -> usize {
    16_000
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_iterations: default_max_iterations(),
            max_tool_output_bytes: default_max_tool_output_bytes(),
            system_prompt: default_system_prompt(),
        }
    }
}

// ---------------------------------------------------------------------------
// Log config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text", "compact" or "json".
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Log directory; defaults to ~/.grok-cli/logs.
    pub dir: Option<String>,
    #[serde(default)]
    pub module_levels: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: None,
            module_levels: HashMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Fill an empty API key from `XAI_API_KEY`.
    pub fn apply_env(&mut self) {
        if self.provider.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.provider.api_key = key;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Paths & loading
// ---------------------------------------------------------------------------

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".grok-cli")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

pub fn log_dir_path(cfg: &Config) -> PathBuf {
    match &cfg.log.dir {
        Some(raw) if raw.starts_with('~') => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(raw.trim_start_matches('~').trim_start_matches('/')),
        Some(raw) => PathBuf::from(raw),
        None => config_dir().join("logs"),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = path.map(PathBuf::from).unwrap_or_else(config_path);

    if p.exists() {
        let text = std::fs::read_to_string(&p)
            .with_context(|| format!("reading config from {}", p.display()))?;
        let cfg: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config from {}", p.display()))?;
        Ok(cfg)
    } else {
        Ok(Config::default())
    }
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let p = path.map(PathBuf::from).unwrap_or_else(config_path);

    if let Some(parent) = p.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(cfg)?;
    std::fs::write(&p, json).with_context(|| format!("writing config to {}", p.display()))?;
    Ok(())
}
