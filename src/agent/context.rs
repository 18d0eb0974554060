//! Context builder: assembles the system prompt for the agent.

use chrono::{DateTime, Local};
use std::path::Path;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant with access to file tools. Use the tools when needed to help the user.";

/// Base prompt followed by the current time and the working directory the file tools are confined to.
pub fn build_system_prompt(base: &str, working_dir: &Path) -> String {
    build_system_prompt_at(base, working_dir, Local::now())
}

pub fn build_system_prompt_at(base: &str, working_dir: &Path, now: DateTime<Local>) -> String {
    let now = now.format("%Y-%m-%d %H:%M (%A)");
    format!(
        "{base}\n\n\
         ## Current Time\n{now}\n\n\
         ## Working Directory\n{}\n\
         Relative paths are resolved against this directory. \
         File operations outside it are refused.",
        working_dir.display()
    )
}
