//! CLI commands module.

mod chat;
mod helpers;
mod init;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use chat::cmd_chat;
pub use helpers::ProviderOverrides;
pub use init::cmd_init;
pub use tools::cmd_tools;

#[derive(Parser)]
#[command(name = "grok-cli", version, about = "Chat with Grok using file tools confined to the current directory")]
struct Cli {
    /// Config file (default: ~/.grok-cli/config.json).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent (one-shot or interactive).
    Chat {
        /// Single message to process (non-interactive).
        #[arg(short, long)]
        message: Option<String>,

        #[command(flatten)]
        overrides: ProviderOverrides,
    },

    /// Write a default config file.
    Init,

    /// List the file tools and the directory they are confined to.
    Tools,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Chat { message, overrides }) => cmd_chat(config_path, message, overrides).await,
        None => cmd_chat(config_path, None, ProviderOverrides::default()).await,
        Some(Commands::Init) => cmd_init(config_path).await,
        Some(Commands::Tools) => cmd_tools().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_one_shot_chat_with_overrides() {
        let cli = Cli::try_parse_from([
            "grok-cli", "chat", "-m", "hello", "--model", "grok-3", "--api-base", "http://localhost:1234/v1",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Chat { message, overrides }) => {
                assert_eq!(message.as_deref(), Some("hello"));
                assert_eq!(overrides.model.as_deref(), Some("grok-3"));
                assert_eq!(overrides.api_base.as_deref(), Some("http://localhost:1234/v1"));
                assert!(overrides.api_key.is_none());
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn no_subcommand_means_interactive_chat() {
        let cli = Cli::try_parse_from(["grok-cli", "--config", "/tmp/c.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
    }
}
