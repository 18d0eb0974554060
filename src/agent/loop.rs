//! Tool-calling loop -- drives one user turn to a final reply.

use rig::message::{AssistantContent, Message, ToolResultContent, UserContent};
use rig::OneOrMany;
use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::rig_provider::{CompletionBackend, CompletionTurn};
use crate::tools::ToolRegistry;

pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";
pub const EMPTY_REPLY_MESSAGE: &str = "Sorry, I couldn't generate a response.";

/// Fixed parameters of the loop for one agent instance.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub preamble: String,
    pub temperature: f64,
    pub max_tokens: u64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub output: String,
    pub iterations: u32,
    pub tool_calls: usize,
    pub hit_iteration_limit: bool,
}

/// Run model rounds until a reply without tool calls, or the iteration cap.
///
/// `history` is the conversation before this turn. Tool calls and their
/// results accumulate in a scratchpad that is discarded afterwards.
pub async fn run_tool_loop(
    backend: &dyn CompletionBackend,
    settings: &LoopSettings,
    history: Vec<Message>,
    user_message: &str,
    tools: &ToolRegistry,
) -> Result<LoopOutcome, AgentError> {
    let tool_defs = tools.rig_definitions();
    let mut transcript = history;
    transcript.push(Message::user(user_message));

    let mut iterations = 0u32;
    let mut tool_calls = 0usize;

    loop {
        if iterations >= settings.max_iterations {
            warn!(max_iterations = settings.max_iterations, "Max iterations reached");
            return Ok(LoopOutcome {
                output: ITERATION_LIMIT_MESSAGE.to_string(),
                iterations,
                tool_calls,
                hit_iteration_limit: true,
            });
        }
        iterations += 1;

        let mut prior = transcript.clone();
        let prompt = match prior.pop() {
            Some(m) => m,
            None => Message::user(user_message),
        };
        let turn = CompletionTurn {
            preamble: settings.preamble.clone(),
            history: prior,
            prompt,
            tools: tool_defs.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };

        debug!(iteration = iterations, messages = transcript.len(), "Requesting completion");
        let response = backend.complete(turn).await?;

        let mut text_parts = Vec::new();
        let mut assistant_contents = Vec::new();
        let mut tool_results = Vec::new();

        for content in response.iter() {
            match content {
                AssistantContent::Text(t) => {
                    text_parts.push(t.text.clone());
                    assistant_contents.push(content.clone());
                }
                AssistantContent::ToolCall(tc) => {
                    assistant_contents.push(content.clone());
                    tool_calls += 1;
                    let result = tools
                        .execute(&tc.function.name, tc.function.arguments.clone())
                        .await;
                    let result_str = match result {
                        Ok(s) => s,
                        Err(e) => format!("Error: {e}"),
                    };
                    let body = OneOrMany::one(ToolResultContent::text(result_str));
                    let user_content = match tc.call_id.clone() {
                        Some(call_id) => {
                            UserContent::tool_result_with_call_id(tc.id.clone(), call_id, body)
                        }
                        None => UserContent::tool_result(tc.id.clone(), body),
                    };
                    tool_results.push(user_content);
                }
                _ => {}
            }
        }

        if tool_results.is_empty() {
            let reply = text_parts.join("");
            let output = if reply.trim().is_empty() {
                EMPTY_REPLY_MESSAGE.to_string()
            } else {
                reply
            };
            info!(iterations, tool_calls, "Turn complete");
            return Ok(LoopOutcome {
                output,
                iterations,
                tool_calls,
                hit_iteration_limit: false,
            });
        }

        let content = OneOrMany::many(assistant_contents)
            .map_err(|_| AgentError::Unknown("assistant turn had no content".into()))?;
        transcript.push(Message::Assistant { id: None, content });
        let content = OneOrMany::many(tool_results)
            .map_err(|_| AgentError::Unknown("tool turn had no results".into()))?;
        transcript.push(Message::User { content });
    }
}
