//! Shared helpers for integration tests: proptest presets, a scripted model
//! backend and a probe tool that records its calls.
#![allow(dead_code)]

use async_trait::async_trait;
use grok_cli::rig_provider::{BackendFuture, CompletionBackend, CompletionTurn};
use grok_cli::tools::DynTool;
use proptest::prelude::*;
use rig::completion::CompletionError;
use rig::message::AssistantContent;
use rig::OneOrMany;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Standard proptest configuration with 100 cases.
pub fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 100,
        ..ProptestConfig::default()
    }
}

/// A single path component that is never `.` or `..`.
pub fn path_component() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-][a-zA-Z0-9_.-]{0,15}"
}

pub type Reply = Result<OneOrMany<AssistantContent>, CompletionError>;

pub fn text(s: &str) -> Reply {
    Ok(OneOrMany::one(AssistantContent::text(s)))
}

pub fn tool_call(id: &str, name: &str, args: Value) -> Reply {
    Ok(OneOrMany::one(AssistantContent::tool_call(id, name, args)))
}

/// Replays canned replies in order, then answers "done".
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    pub seen: Mutex<Vec<CompletionTurn>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn turns(&self) -> Vec<CompletionTurn> {
        self.seen.lock().unwrap().clone()
    }
}

impl CompletionBackend for ScriptedBackend {
    fn complete(&self, turn: CompletionTurn) -> BackendFuture<'_> {
        self.seen.lock().unwrap().push(turn);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| text("done"));
        Box::pin(async move { next })
    }
}

/// A `read_file` stand-in that counts how often it actually runs.
#[derive(Default)]
pub struct ProbeReadTool {
    pub calls: AtomicUsize,
}

impl ProbeReadTool {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DynTool for ProbeReadTool {
    fn name(&self) -> &str {
        "read_file"
    }
    fn description(&self) -> &str {
        "probe"
    }
    fn parameters_schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {"path": {"type": "string"}}})
    }
    fn path_arguments(&self) -> &[&'static str] {
        &["path"]
    }
    async fn call(&self, args: Value) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("probe read {}", args["path"].as_str().unwrap_or("?")))
    }
}
