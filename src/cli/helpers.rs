//! Helper functions for CLI commands.

use clap::Args;

use crate::config::Config;

/// Command-line overrides for the provider section of the config.
#[derive(Args, Debug, Default, Clone)]
pub struct ProviderOverrides {
    /// API key (default: config file, then $XAI_API_KEY).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model override (e.g. "grok-4-0709").
    #[arg(long)]
    pub model: Option<String>,

    /// API base URL override (e.g. "https://api.x.ai/v1").
    #[arg(long)]
    pub api_base: Option<String>,

    /// Provider override ("xai", "openai", "anthropic").
    #[arg(short, long)]
    pub provider: Option<String>,
}

/// Resolve the effective provider settings: flags, then config file, then environment.
pub fn apply_overrides(cfg: &mut Config, overrides: ProviderOverrides) {
    if let Some(key) = overrides.api_key {
        cfg.provider.api_key = key;
    }
    if let Some(model) = overrides.model {
        cfg.provider.model = model;
    }
    if let Some(base) = overrides.api_base {
        cfg.provider.api_base = Some(base);
    }
    if let Some(provider) = overrides.provider {
        cfg.provider.name = provider;
    }
    cfg.apply_env();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_win_over_file_values() {
        let mut cfg = Config::default();
        cfg.provider.api_key = "from-file".into();
        apply_overrides(
            &mut cfg,
            ProviderOverrides {
                api_key: Some("from-flag".into()),
                model: Some("grok-3-mini".into()),
                api_base: None,
                provider: None,
            },
        );
        assert_eq!(cfg.provider.api_key, "from-flag");
        assert_eq!(cfg.provider.model, "grok-3-mini");
        assert_eq!(cfg.provider.api_base.as_deref(), Some("https://api.x.ai/v1"));
        assert_eq!(cfg.provider.name, "xai");
    }
}
