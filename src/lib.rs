//! # grok-cli - a conversational agent confined to one directory
//!
//! A chat agent backed by Grok (or any OpenAI/Anthropic-compatible endpoint)
//! with a set of file tools. Every file tool is wrapped by a [`PathGuard`]
//! that refuses any path resolving outside the directory the agent was
//! started in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use grok_cli::config::{AgentSettings, ProviderConfig};
//! use grok_cli::GrokAgent;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = ProviderConfig {
//!         api_key: std::env::var("XAI_API_KEY")?,
//!         ..ProviderConfig::default()
//!     };
//!     let agent = GrokAgent::new(&provider, &AgentSettings::default())?;
//!     let reply = agent.chat("What files are in this directory?").await;
//!     assert!(!reply.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`agent`] - the agent, its tool-calling loop and conversation memory
//! - [`guard`] - working-directory confinement for tool arguments
//! - [`tools`] - tool registry and the file tools
//! - [`rig_provider`] - model backends built on rig
//! - [`config`] - JSON configuration under `~/.grok-cli`
//! - [`logging`] - tracing setup

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod logging;
pub mod rig_provider;
pub mod tools;

pub use agent::GrokAgent;
pub use error::AgentError;
pub use guard::PathGuard;
