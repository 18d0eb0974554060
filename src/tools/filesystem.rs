//! File-system toolset: read_file, write_file, edit_file, list_dir, create_dir, find_files.
//!
//! These tools do no scoping of their own. Relative paths are joined onto the
//! toolset root; the agent wraps every tool in a [`crate::guard::PathGuard`]
//! rooted at the same directory before the model ever sees them.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::tools::{DynTool, ToolRegistry};

/// Upper bound on `find_files` matches returned to the model.
const MAX_FIND_RESULTS: usize = 200;

fn resolve(root: &Path, raw: &str) -> PathBuf {
    let p = Path::new(raw);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("missing required string argument '{}'", key))
}

/// Build a registry holding the whole file toolset rooted at `root`.
pub fn file_toolset(root: &Path) -> anyhow::Result<ToolRegistry> {
    let root = root.to_path_buf();
    let mut reg = ToolRegistry::new();
    reg.register(Arc::new(ReadFileTool { root: root.clone() }))?;
    reg.register(Arc::new(WriteFileTool { root: root.clone() }))?;
    reg.register(Arc::new(EditFileTool { root: root.clone() }))?;
    reg.register(Arc::new(ListDirTool { root: root.clone() }))?;
    reg.register(Arc::new(CreateDirTool { root: root.clone() }))?;
    reg.register(Arc::new(FindFilesTool { root }))?;
    Ok(reg)
}

// ---- ReadFile ----

pub struct ReadFileTool {
    pub root: PathBuf,
}

#[async_trait::async_trait]
impl DynTool for ReadFileTool {
    fn name(&self) -> &str { "read_file" }
    fn description(&self) -> &str { "Read the contents of a file." }
    fn parameters_schema(&self) -> Value {
        json!({"type":"object","properties":{"path":{"type":"string","description":"File path, relative to the working directory"}},"required":["path"]})
    }
    fn path_arguments(&self) -> &[&'static str] { &["path"] }
    async fn call(&self, args: Value) -> anyhow::Result<String> {
        let path = resolve(&self.root, str_arg(&args, "path")?);
        info!(path = %path.display(), "read_file");
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

// ---- WriteFile ----

pub struct WriteFileTool {
    pub root: PathBuf,
}

#[async_trait::async_trait]
impl DynTool for WriteFileTool {
    fn name(&self) -> &str { "write_file" }
    fn description(&self) -> &str { "Write content to a file (creates parent directories if needed, overwrites existing files)." }
    fn parameters_schema(&self) -> Value {
        json!({"type":"object","properties":{"path":{"type":"string"},"content":{"type":"string"}},"required":["path","content"]})
    }
    fn path_arguments(&self) -> &[&'static str] { &["path"] }
    async fn call(&self, args: Value) -> anyhow::Result<String> {
        let path = resolve(&self.root, str_arg(&args, "path")?);
        let content = str_arg(&args, "content")?;
        info!(path = %path.display(), len = content.len(), "write_file");
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        Ok(format!("Wrote {} bytes to {}", content.len(), path.display()))
    }
}

// ---- EditFile ----

pub struct EditFileTool {
    pub root: PathBuf,
}

#[async_trait::async_trait]
impl DynTool for EditFileTool {
    fn name(&self) -> &str { "edit_file" }
    fn description(&self) -> &str { "Edit a file by replacing the first occurrence of old_text with new_text." }
    fn parameters_schema(&self) -> Value {
        json!({"type":"object","properties":{"path":{"type":"string"},"old_text":{"type":"string"},"new_text":{"type":"string"}},"required":["path","old_text","new_text"]})
    }
    fn path_arguments(&self) -> &[&'static str] { &["path"] }
    async fn call(&self, args: Value) -> anyhow::Result<String> {
        let path = resolve(&self.root, str_arg(&args, "path")?);
        let old = str_arg(&args, "old_text")?;
        let new = str_arg(&args, "new_text")?;
        info!(path = %path.display(), "edit_file");
        let content = tokio::fs::read_to_string(&path).await?;
        if !content.contains(old) {
            anyhow::bail!("old_text not found in {}", path.display());
        }
        tokio::fs::write(&path, content.replacen(old, new, 1)).await?;
        Ok(format!("Edited {}", path.display()))
    }
}

// ---- ListDir ----

pub struct ListDirTool {
    pub root: PathBuf,
}

#[async_trait::async_trait]
impl DynTool for ListDirTool {
    fn name(&self) -> &str { "list_dir" }
    fn description(&self) -> &str {
        "List contents of a directory: returns both subdirectories and files, clearly labeled."
    }
    fn parameters_schema(&self) -> Value {
        json!({"type":"object","properties":{"path":{"type":"string","description":"Directory path (default '.' for the working directory)"}},"required":["path"]})
    }
    fn path_arguments(&self) -> &[&'static str] { &["path"] }
    async fn call(&self, args: Value) -> anyhow::Result<String> {
        let path = resolve(&self.root, args["path"].as_str().unwrap_or("."));
        info!(path = %path.display(), "list_dir");
        let mut entries = tokio::fs::read_dir(&path).await?;
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let ft = entry.file_type().await?;
            if ft.is_dir() {
                dirs.push(name);
            } else {
                files.push(name);
            }
        }
        dirs.sort();
        files.sort();
        let mut out = Vec::new();
        if !dirs.is_empty() {
            out.push("Directories:".to_string());
            for d in &dirs {
                out.push(format!("  {} (dir)", d));
            }
        }
        if !files.is_empty() {
            out.push("Files:".to_string());
            for f in &files {
                out.push(format!("  {}", f));
            }
        }
        if out.is_empty() {
            out.push("(empty directory)".to_string());
        }
        Ok(out.join("\n"))
    }
}

// ---- CreateDir ----

pub struct CreateDirTool {
    pub root: PathBuf,
}

#[async_trait::async_trait]
impl DynTool for CreateDirTool {
    fn name(&self) -> &str { "create_dir" }
    fn description(&self) -> &str { "Create a directory, including any missing parents." }
    fn parameters_schema(&self) -> Value {
        json!({"type":"object","properties":{"path":{"type":"string"}},"required":["path"]})
    }
    fn path_arguments(&self) -> &[&'static str] { &["path"] }
    async fn call(&self, args: Value) -> anyhow::Result<String> {
        let path = resolve(&self.root, str_arg(&args, "path")?);
        info!(path = %path.display(), "create_dir");
        tokio::fs::create_dir_all(&path).await?;
        Ok(format!("Created directory {}", path.display()))
    }
}

// ---- FindFiles ----

pub struct FindFilesTool {
    pub root: PathBuf,
}

#[async_trait::async_trait]
impl DynTool for FindFilesTool {
    fn name(&self) -> &str { "find_files" }
    fn description(&self) -> &str {
        "Find files matching a glob pattern (e.g. '**/*.rs') under a directory. Results are relative to that directory."
    }
    fn parameters_schema(&self) -> Value {
        json!({"type":"object","properties":{"pattern":{"type":"string"},"path":{"type":"string","description":"Directory to search (default '.')"}},"required":["pattern"]})
    }
    fn path_arguments(&self) -> &[&'static str] { &["path", "pattern"] }
    async fn call(&self, args: Value) -> anyhow::Result<String> {
        let pattern = str_arg(&args, "pattern")?.to_string();
        let base = resolve(&self.root, args["path"].as_str().unwrap_or("."));
        info!(base = %base.display(), pattern = %pattern, "find_files");

        let root = self.root.clone();
        tokio::task::spawn_blocking(move || find_matches(&root, &base, &pattern)).await?
    }
}

/// Glob `pattern` under `base`, keeping only matches whose real location is under `root`.
///
/// Wildcards can expand through symlinks the literal pattern never names.
fn find_matches(root: &Path, base: &Path, pattern: &str) -> anyhow::Result<String> {
    if Path::new(pattern).is_absolute() {
        anyhow::bail!("pattern must be relative to the search directory");
    }
    let real_root = std::fs::canonicalize(root)?;
    let full = base.join(pattern);
    let full = full
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("search path is not valid UTF-8"))?;

    let mut matches = Vec::new();
    let mut total = 0usize;
    for entry in glob::glob(full)? {
        let path = match entry {
            Ok(p) => p,
            Err(_) => continue,
        };
        match std::fs::canonicalize(&path) {
            Ok(real) if real.starts_with(&real_root) => {}
            _ => {
                debug!(path = %path.display(), "find_files match outside root skipped");
                continue;
            }
        }
        total += 1;
        if matches.len() < MAX_FIND_RESULTS {
            let shown = path.strip_prefix(base).unwrap_or(&path);
            matches.push(shown.display().to_string());
        }
    }
    matches.sort();

    if matches.is_empty() {
        return Ok(format!("No files matching '{}'", pattern));
    }
    let mut out = matches.join("\n");
    if total > MAX_FIND_RESULTS {
        out.push_str(&format!("\n... ({} more matches not shown)", total - MAX_FIND_RESULTS));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_in(dir: &Path, name: &str) -> Arc<dyn DynTool> {
        let reg = file_toolset(dir).unwrap();
        reg.get(name).unwrap().clone()
    }

    #[test]
    fn toolset_registers_every_file_tool() {
        let dir = tempfile::tempdir().unwrap();
        let reg = file_toolset(dir.path()).unwrap();
        assert_eq!(
            reg.names(),
            vec!["create_dir", "edit_file", "find_files", "list_dir", "read_file", "write_file"]
        );
    }

    #[test]
    fn every_tool_declares_its_path_argument() {
        let dir = tempfile::tempdir().unwrap();
        for tool in file_toolset(dir.path()).unwrap().into_tools() {
            assert!(
                tool.path_arguments().contains(&"path"),
                "{} does not declare 'path'",
                tool.name()
            );
        }
    }

    #[tokio::test]
    async fn write_then_read_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let write = tool_in(dir.path(), "write_file");
        let out = write
            .call(json!({"path": "notes/today.txt", "content": "hello"}))
            .await
            .unwrap();
        assert!(out.starts_with("Wrote 5 bytes"));
        assert!(dir.path().join("notes/today.txt").exists());

        let read = tool_in(dir.path(), "read_file");
        let text = read.call(json!({"path": "notes/today.txt"})).await.unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn read_missing_argument_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let read = tool_in(dir.path(), "read_file");
        let err = read.call(json!({})).await.unwrap_err();
        assert!(err.to_string().contains("'path'"));
    }

    #[tokio::test]
    async fn edit_replaces_first_occurrence_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one two one").unwrap();
        let edit = tool_in(dir.path(), "edit_file");
        edit.call(json!({"path": "a.txt", "old_text": "one", "new_text": "1"}))
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "1 two one");

        let err = edit
            .call(json!({"path": "a.txt", "old_text": "zzz", "new_text": "y"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("old_text not found"));
    }

    #[tokio::test]
    async fn list_dir_labels_dirs_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();

        let list = tool_in(dir.path(), "list_dir");
        let out = list.call(json!({"path": "."})).await.unwrap();
        assert_eq!(out, "Directories:\n  src (dir)\nFiles:\n  a.txt\n  b.txt");
    }

    #[tokio::test]
    async fn list_dir_reports_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let list = tool_in(dir.path(), "list_dir");
        assert_eq!(list.call(json!({})).await.unwrap(), "(empty directory)");
    }

    #[tokio::test]
    async fn create_dir_builds_parents() {
        let dir = tempfile::tempdir().unwrap();
        let create = tool_in(dir.path(), "create_dir");
        create.call(json!({"path": "x/y/z"})).await.unwrap();
        assert!(dir.path().join("x/y/z").is_dir());
    }

    #[tokio::test]
    async fn find_files_returns_relative_sorted_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "").unwrap();
        std::fs::write(dir.path().join("src/nested/lib.rs"), "").unwrap();
        std::fs::write(dir.path().join("README.md"), "").unwrap();

        let find = tool_in(dir.path(), "find_files");
        let out = find.call(json!({"pattern": "**/*.rs"})).await.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("main.rs"));
        assert!(lines[1].ends_with("lib.rs"));
        assert!(!out.contains("README"));
    }

    #[tokio::test]
    async fn find_files_reports_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        let find = tool_in(dir.path(), "find_files");
        let out = find.call(json!({"pattern": "*.nothing"})).await.unwrap();
        assert_eq!(out, "No files matching '*.nothing'");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn find_files_skips_matches_behind_escaping_symlinks() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "s").unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "n").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let find = tool_in(dir.path(), "find_files");
        let out = find.call(json!({"pattern": "lin?/*"})).await.unwrap();
        assert_eq!(out, "No files matching 'lin?/*'");

        let out = find.call(json!({"pattern": "**/*.txt"})).await.unwrap();
        assert_eq!(out, "notes.txt");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn find_files_keeps_symlinks_that_stay_inside() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::fs::write(dir.path().join("real/a.md"), "").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();

        let find = tool_in(dir.path(), "find_files");
        let out = find.call(json!({"pattern": "alia?/*.md"})).await.unwrap();
        assert_eq!(out, "alias/a.md");
    }
}
