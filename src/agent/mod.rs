//! The Grok agent: a model backend, guarded file tools and conversation memory.

pub mod context;
pub mod r#loop;
pub mod memory;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, Instrument};

use crate::config::{AgentSettings, ProviderConfig};
use crate::error::AgentError;
use crate::guard::PathGuard;
use crate::rig_provider::{build_completion_backend, CompletionBackend};
use crate::tools::{filesystem, ToolRegistry};
use memory::ConversationMemory;
use r#loop::{run_tool_loop, LoopSettings};

pub struct GrokAgent {
    backend: Arc<dyn CompletionBackend>,
    guard: Arc<PathGuard>,
    tools: ToolRegistry,
    memory: Mutex<ConversationMemory>,
    settings: AgentSettings,
}

impl GrokAgent {
    /// Build an agent against the configured provider, sandboxed to the current directory.
    pub fn new(provider: &ProviderConfig, settings: &AgentSettings) -> Result<Self> {
        if provider.api_key.trim().is_empty() {
            anyhow::bail!("An API key is required to construct the agent");
        }
        let backend = build_completion_backend(
            &provider.name,
            &provider.model,
            &provider.api_key,
            provider.api_base.as_deref(),
        )
        .with_context(|| format!("building '{}' client", provider.name))?;
        let guard = PathGuard::establish().context("resolving the working directory")?;
        info!(
            provider = %provider.name,
            model = %provider.model,
            working_dir = %guard.boundary().display(),
            "Agent configured"
        );
        Self::with_backend(backend, guard, settings)
    }

    /// Build an agent over an arbitrary backend with file tools rooted at the guard's boundary.
    pub fn with_backend(
        backend: Arc<dyn CompletionBackend>,
        guard: PathGuard,
        settings: &AgentSettings,
    ) -> Result<Self> {
        let toolset = filesystem::file_toolset(guard.boundary())?;
        Self::with_tools(backend, guard, toolset, settings)
    }

    /// Build an agent over an externally supplied toolset; every tool is wrapped by `guard`.
    pub fn with_tools(
        backend: Arc<dyn CompletionBackend>,
        guard: PathGuard,
        toolset: ToolRegistry,
        settings: &AgentSettings,
    ) -> Result<Self> {
        let guard = Arc::new(guard);
        let tools = guard
            .wrap_registry(toolset)?
            .with_output_limit(settings.max_tool_output_bytes);
        Ok(Self {
            backend,
            guard,
            tools,
            memory: Mutex::new(ConversationMemory::new()),
            settings: settings.clone(),
        })
    }

    /// Loop parameters for one turn; the preamble carries the time of this turn.
    fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            preamble: context::build_system_prompt(&self.settings.system_prompt, self.guard.boundary()),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            max_iterations: self.settings.max_iterations,
        }
    }

    pub fn working_dir(&self) -> &Path {
        self.guard.boundary()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Send one message and get the reply. Failures come back as text, never as an error.
    ///
    /// The reply is also printed to stdout.
    pub async fn chat(&self, user_message: &str) -> String {
        let output = match self.try_chat(user_message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, rate_limited = e.is_rate_limited(), "Chat turn failed");
                e.user_message()
            }
        };
        println!("{}", output);
        output
    }

    /// Like [`chat`](Self::chat) but returns the classified error instead of rendering it.
    pub async fn try_chat(&self, user_message: &str) -> Result<String, AgentError> {
        let span = tracing::info_span!("chat_turn", message_length = user_message.len());
        async {
            // Held for the whole turn so concurrent chats on one agent run one at a time.
            let mut memory = self.memory.lock().await;
            let outcome = run_tool_loop(
                self.backend.as_ref(),
                &self.loop_settings(),
                memory.messages(),
                user_message,
                &self.tools,
            )
            .await?;
            memory.save_turn(user_message, &outcome.output);
            info!(
                iterations = outcome.iterations,
                tool_calls = outcome.tool_calls,
                hit_iteration_limit = outcome.hit_iteration_limit,
                "Chat turn complete"
            );
            Ok(outcome.output)
        }
        .instrument(span)
        .await
    }

    /// Forget the conversation so far.
    pub async fn clear_memory(&self) {
        self.memory.lock().await.clear();
    }

    /// Number of remembered messages (two per completed turn).
    pub async fn memory_len(&self) -> usize {
        self.memory.lock().await.len()
    }
}
