pub mod filesystem;
pub mod truncation;

use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, Instrument};

/// Build a short string for logging tool args (path, pattern) without leaking full content.
fn sanitize_args_for_log(tool_name: &str, args: &Value) -> String {
    let obj = match args.as_object() {
        Some(o) => o,
        None => return "args=?".to_string(),
    };
    let part = match tool_name {
        "read_file" | "list_dir" | "create_dir" | "edit_file" => obj
            .get("path")
            .and_then(|v| v.as_str())
            .map(|s| format!("path={}", truncate_for_log(s, 120))),
        "write_file" => obj.get("path").and_then(|v| v.as_str()).map(|s| {
            let len = obj
                .get("content")
                .and_then(|v| v.as_str())
                .map(str::len)
                .unwrap_or(0);
            format!("path={} content_len={}", truncate_for_log(s, 120), len)
        }),
        "find_files" => obj
            .get("pattern")
            .and_then(|v| v.as_str())
            .map(|s| format!("pattern={}", truncate_for_log(s, 80))),
        _ => None,
    };
    part.unwrap_or_else(|| "args=...".to_string())
}

fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} chars)", &s[..end], s.len())
    }
}

/// A type-erased tool that can be stored in the registry.
#[async_trait::async_trait]
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    /// Names of the arguments that carry filesystem paths.
    fn path_arguments(&self) -> &[&'static str] {
        &[]
    }
    async fn call(&self, args: Value) -> Result<String>;
}

/// Metadata about a registered tool, returned by `list_tools`.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub parameters_schema: Value,
}

/// Registry that holds all available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn DynTool>>,
    max_output_bytes: Option<usize>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            max_output_bytes: None,
        }
    }

    /// Cap successful tool output at `max` bytes (head-tail truncation).
    pub fn with_output_limit(mut self, max: usize) -> Self {
        self.max_output_bytes = Some(max);
        self
    }

    /// Register a tool. Returns an error if a tool with the same name already exists.
    pub fn register(&mut self, tool: Arc<dyn DynTool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            anyhow::bail!("Tool '{}' is already registered", name);
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Return metadata about all registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let mut infos: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters_schema: t.parameters_schema(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn DynTool>> {
        self.tools.get(name)
    }

    /// Consume the registry and hand back every tool, sorted by name.
    pub fn into_tools(self) -> Vec<Arc<dyn DynTool>> {
        let mut tools: Vec<_> = self.tools.into_values().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String> {
        let args_for_log = sanitize_args_for_log(name, &args);
        let span = tracing::info_span!(
            "tool_execution",
            tool_name = %name,
            args = %args_for_log,
        );
        debug!(parent: &span, tool_name = %name, args = ?args, "Tool call started");
        let start = std::time::Instant::now();
        let result = match self.tools.get(name) {
            Some(tool) => tool.call(args).instrument(span.clone()).await,
            None => anyhow::bail!("Tool '{}' not found", name),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(s) => {
                let result_preview = truncate_for_log(s, 200);
                info!(
                    parent: &span,
                    tool_name = %name,
                    duration_ms = duration_ms,
                    status = "success",
                    result_preview = %result_preview,
                    "Tool execution completed"
                );
            }
            Err(e) => {
                info!(
                    parent: &span,
                    tool_name = %name,
                    duration_ms = duration_ms,
                    status = "failure",
                    error = %e,
                    "Tool execution failed"
                );
            }
        }

        match (result, self.max_output_bytes) {
            (Ok(output), Some(max)) => {
                let truncated = truncation::smart_truncate(&output, max);
                if truncated.was_truncated() {
                    debug!(
                        parent: &span,
                        tool_name = %name,
                        original_size = truncated.original_size,
                        truncated_size = truncated.truncated_size,
                        "Tool output truncated"
                    );
                }
                Ok(truncated.content)
            }
            (result, _) => result,
        }
    }

    /// Return rig-compatible ToolDefinition list for the LLM.
    pub fn rig_definitions(&self) -> Vec<rig::completion::ToolDefinition> {
        self.list_tools()
            .into_iter()
            .map(|info| rig::completion::ToolDefinition {
                name: info.name,
                description: info.description,
                parameters: info.parameters_schema,
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
