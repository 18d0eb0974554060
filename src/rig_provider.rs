//! Rig-core provider bridge: build completion models from a provider name.
//!
//! Uses rig-core providers directly and exposes a unified [`CompletionBackend`]
//! trait so the agent can hold an `Arc<dyn CompletionBackend>` and tests can
//! substitute a scripted backend.

use anyhow::Result;
use rig::client::CompletionClient;
use rig::completion::request::CompletionError;
use rig::completion::{CompletionModel, ToolDefinition};
use rig::message::{AssistantContent, Message};
use rig::OneOrMany;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub const DEFAULT_PROVIDER: &str = "xai";
pub const DEFAULT_MODEL: &str = "grok-4-0709";
pub const DEFAULT_API_BASE: &str = "https://api.x.ai/v1";

/// One model round-trip: the prior conversation, the new prompt, and the tools on offer.
#[derive(Debug, Clone)]
pub struct CompletionTurn {
    pub preamble: String,
    pub history: Vec<Message>,
    pub prompt: Message,
    pub tools: Vec<ToolDefinition>,
    pub temperature: f64,
    pub max_tokens: u64,
}

pub type BackendFuture<'a> = Pin<
    Box<dyn Future<Output = Result<OneOrMany<AssistantContent>, CompletionError>> + Send + 'a>,
>;

/// Provider-agnostic completion model.
pub trait CompletionBackend: Send + Sync {
    fn complete(&self, turn: CompletionTurn) -> BackendFuture<'_>;
}

/// Build an `Arc<dyn CompletionBackend>` from provider name, model name, API key and optional base URL.
pub fn build_completion_backend(
    provider_name: &str,
    model_name: &str,
    api_key: &str,
    api_base: Option<&str>,
) -> Result<Arc<dyn CompletionBackend>> {
    let mk_http = reqwest::Client::new;
    let base = api_base.map(str::trim).filter(|b| !b.is_empty());

    let lower = provider_name.to_lowercase();
    // Turbofish `<reqwest::Client>` pins H so the compiler knows the initial http client type
    // before .http_client(mk_http()) swaps it in.
    type RC = reqwest::Client;
    let model = if lower.contains("xai") || lower.contains("grok") {
        let mut builder = rig::providers::xai::Client::<RC>::builder()
            .api_key(api_key.to_string())
            .http_client(mk_http());
        if let Some(base) = base {
            builder = builder.base_url(base);
        }
        let client = builder.build().map_err(|e| anyhow::anyhow!("{}", e))?;
        let m = client.completion_model(model_name.to_string());
        Arc::new(XaiModel(client, m)) as Arc<dyn CompletionBackend>
    } else if lower.contains("anthropic") || lower.contains("claude") {
        let mut builder = rig::providers::anthropic::Client::<RC>::builder()
            .api_key(api_key.to_string())
            .http_client(mk_http());
        if let Some(base) = anthropic_base(base) {
            builder = builder.base_url(base);
        }
        let client = builder.build().map_err(|e| anyhow::anyhow!("{}", e))?;
        let m = client.completion_model(model_name.to_string());
        Arc::new(AnthropicModel(client, m)) as Arc<dyn CompletionBackend>
    } else {
        // OpenAI or any OpenAI-compatible endpoint.
        let mut builder = rig::providers::openai::Client::<RC>::builder()
            .api_key(api_key.to_string())
            .http_client(mk_http());
        if let Some(base) = base {
            builder = builder.base_url(base);
        }
        let client = builder.build().map_err(|e| anyhow::anyhow!("{}", e))?;
        let m = client.completion_model(model_name.to_string());
        Arc::new(OpenAiModel(client, m)) as Arc<dyn CompletionBackend>
    };
    Ok(model)
}

/// The config default points at xAI; it is never an Anthropic endpoint.
fn anthropic_base(base: Option<&str>) -> Option<&str> {
    base.filter(|b| b.trim_end_matches('/') != DEFAULT_API_BASE)
}

macro_rules! impl_model {
    ($name:ident, $client:ty) => {
        struct $name(
            #[allow(dead_code)] $client,
            <$client as CompletionClient>::CompletionModel,
        );
        impl CompletionBackend for $name {
            fn complete(&self, turn: CompletionTurn) -> BackendFuture<'_> {
                let m = &self.1;
                let fut = async move {
                    let request = m
                        .completion_request(turn.prompt)
                        .preamble(turn.preamble)
                        .messages(turn.history)
                        .tools(turn.tools)
                        .temperature(turn.temperature)
                        .max_tokens(turn.max_tokens)
                        .build();
                    let r = m.completion(request).await?;
                    Ok(r.choice)
                };
                Box::pin(fut)
            }
        }
    };
}

impl_model!(XaiModel, rig::providers::xai::Client);
impl_model!(OpenAiModel, rig::providers::openai::Client);
impl_model!(AnthropicModel, rig::providers::anthropic::Client);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_default_xai_backend() {
        assert!(build_completion_backend(DEFAULT_PROVIDER, DEFAULT_MODEL, "test-key", Some(DEFAULT_API_BASE)).is_ok());
    }

    #[test]
    fn unknown_provider_falls_back_to_openai_compatible() {
        assert!(build_completion_backend("my-gateway", "some-model", "k", Some("http://localhost:8080/v1")).is_ok());
    }

    #[test]
    fn blank_base_url_is_ignored() {
        assert!(build_completion_backend("openai", "gpt-4o", "k", Some("   ")).is_ok());
    }

    #[test]
    fn anthropic_honours_custom_base_but_not_xai_default() {
        assert_eq!(anthropic_base(Some("https://proxy.internal/anthropic")), Some("https://proxy.internal/anthropic"));
        assert_eq!(anthropic_base(Some(DEFAULT_API_BASE)), None);
        assert_eq!(anthropic_base(Some("https://api.x.ai/v1/")), None);
        assert_eq!(anthropic_base(None), None);
        assert!(build_completion_backend("anthropic", "claude-sonnet-4", "k", Some("http://localhost:9000")).is_ok());
    }
}
