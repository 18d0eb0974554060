//! Errors surfaced by a chat turn and their user-facing rendering.

use rig::completion::CompletionError;
use thiserror::Error;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Failure of a single `chat` turn, classified once where the backend error is converted.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("{0}")]
    Unknown(String),
}

impl AgentError {
    /// Raw error text without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            AgentError::RateLimited(s)
            | AgentError::Transport(s)
            | AgentError::Provider(s)
            | AgentError::Unknown(s) => s,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AgentError::RateLimited(_))
    }

    /// Message returned from `chat` in place of a reply.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::RateLimited(_) => RATE_LIMIT_MESSAGE.to_string(),
            other => format!("An error occurred: {}", other.detail()),
        }
    }
}

/// Providers report throttling as HTTP 429 or a `rate_limit*` error code in the body.
pub fn looks_rate_limited(text: &str) -> bool {
    text.contains("429") || text.to_lowercase().contains("rate_limit")
}

impl From<CompletionError> for AgentError {
    fn from(e: CompletionError) -> Self {
        let text = e.to_string();
        if looks_rate_limited(&text) {
            return AgentError::RateLimited(text);
        }
        match e {
            CompletionError::HttpError(_) => AgentError::Transport(text),
            CompletionError::ProviderError(_) | CompletionError::ResponseError(_) => {
                AgentError::Provider(text)
            }
            _ => AgentError::Unknown(text),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(e: anyhow::Error) -> Self {
        let text = format!("{e:#}");
        if looks_rate_limited(&text) {
            AgentError::RateLimited(text)
        } else {
            AgentError::Unknown(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_rate_limited() {
        let err = AgentError::from(CompletionError::ProviderError(
            "HTTP 429 Too Many Requests".into(),
        ));
        assert!(err.is_rate_limited());
        assert_eq!(err.user_message(), RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn rate_limit_code_is_case_insensitive() {
        let err = AgentError::from(CompletionError::ProviderError(
            r#"{"error":{"code":"Rate_Limit_Exceeded"}}"#.into(),
        ));
        assert!(err.is_rate_limited());
    }

    #[test]
    fn provider_error_is_generic() {
        let err = AgentError::from(CompletionError::ProviderError("invalid api key".into()));
        assert!(matches!(err, AgentError::Provider(_)));
        let msg = err.user_message();
        assert!(msg.starts_with("An error occurred: "));
        assert!(msg.contains("invalid api key"));
    }

    #[test]
    fn response_error_is_provider() {
        let err = AgentError::from(CompletionError::ResponseError("no choices".into()));
        assert!(matches!(err, AgentError::Provider(_)));
    }

    #[test]
    fn anyhow_error_keeps_context_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("disk full"));
        let err = AgentError::from(anyhow::Context::context(inner, "saving").unwrap_err());
        assert_eq!(err.detail(), "saving: disk full");
        assert_eq!(err.user_message(), "An error occurred: saving: disk full");
    }

    #[test]
    fn anyhow_rate_limit_text_is_detected() {
        let err = AgentError::from(anyhow::anyhow!("upstream returned 429"));
        assert!(err.is_rate_limited());
    }
}
