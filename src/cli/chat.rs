//! Chat command - talk to the agent (one-shot or interactive).

use anyhow::Result;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::helpers::{apply_overrides, ProviderOverrides};
use crate::agent::GrokAgent;
use crate::config;
use crate::logging;

pub async fn cmd_chat(
    config_path: Option<&Path>,
    message: Option<String>,
    overrides: ProviderOverrides,
) -> Result<()> {
    let mut cfg = config::load_config(config_path)?;
    apply_overrides(&mut cfg, overrides);

    let _log_guard = logging::init_logging(&cfg)?;

    if cfg.provider.api_key.trim().is_empty() {
        anyhow::bail!(
            "No API key configured. Set {} or run `grok-cli init` and edit {}",
            config::API_KEY_ENV,
            config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(config::config_path)
                .display()
        );
    }

    let agent = GrokAgent::new(&cfg.provider, &cfg.agent)?;
    info!(model = %cfg.provider.model, "Starting chat");

    // `chat` prints the reply itself.
    if let Some(msg) = message {
        agent.chat(&msg).await;
        return Ok(());
    }

    println!(
        "grok-cli interactive mode in {} (type 'exit' to quit, '/clear' to forget)",
        agent.working_dir().display()
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.is_empty() {
            continue;
        }
        if input == "/clear" {
            agent.clear_memory().await;
            println!("Conversation cleared.");
            continue;
        }
        agent.chat(input).await;
    }
    Ok(())
}
