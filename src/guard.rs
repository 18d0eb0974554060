//! Working-directory sandbox for file tools.
//!
//! [`PathGuard`] captures a canonical boundary once and answers whether a
//! candidate path resolves inside it. [`GuardedTool`] wraps any [`DynTool`]
//! so that path-like arguments are checked before the inner tool runs; a
//! rejected call returns the denial text as ordinary tool output.

use serde_json::Value;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::tools::{DynTool, ToolRegistry};

/// Normalize path for prefix comparison so that the Windows verbatim prefix (\\?\)
/// produced by `canonicalize` compares equal to paths built without it.
#[cfg(windows)]
fn path_for_prefix_check(p: &Path) -> PathBuf {
    let s = p.to_string_lossy();
    let s = s.trim_start_matches(r"\\?\");
    PathBuf::from(s)
}

#[cfg(not(windows))]
fn path_for_prefix_check(p: &Path) -> PathBuf {
    p.to_path_buf()
}

/// True if the string contains a path separator (`/` or `\`).
pub fn looks_like_path(s: &str) -> bool {
    s.contains('/') || s.contains('\\')
}

/// Resolve `candidate` to an absolute path without requiring it to exist.
///
/// The existing prefix is resolved physically (symlinks followed, `..` applied
/// after the link). Below a missing component the path is normalized
/// lexically; a `..` that climbs back out resumes physical resolution. Any
/// other filesystem error is returned.
pub fn resolve_lenient(candidate: &Path, base: &Path) -> io::Result<PathBuf> {
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    };

    let mut resolved = PathBuf::new();
    let mut missing = false;
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
                // Climbing out of a missing component lands back on real
                // directories, whose entries may be symlinks again.
                missing = false;
            }
            Component::Normal(name) => {
                resolved.push(name);
                if missing {
                    continue;
                }
                match std::fs::symlink_metadata(&resolved) {
                    Ok(meta) if meta.file_type().is_symlink() => {
                        resolved = std::fs::canonicalize(&resolved)?;
                    }
                    Ok(_) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => missing = true,
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(resolved)
}

/// Filesystem boundary for tool-invoked paths.
#[derive(Debug, Clone)]
pub struct PathGuard {
    boundary: PathBuf,
}

impl PathGuard {
    /// Capture the process's current directory as the boundary.
    pub fn establish() -> io::Result<Self> {
        Self::new(std::env::current_dir()?)
    }

    /// Use `root` (canonicalized) as the boundary. Fails if `root` cannot be resolved.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let boundary = std::fs::canonicalize(root.as_ref())?;
        Ok(Self { boundary })
    }

    pub fn boundary(&self) -> &Path {
        &self.boundary
    }

    /// Whether `candidate` resolves to the boundary or something beneath it.
    ///
    /// Relative candidates are resolved against the boundary. Resolution
    /// errors deny.
    pub fn is_path_allowed(&self, candidate: &str) -> bool {
        match resolve_lenient(Path::new(candidate), &self.boundary) {
            Ok(resolved) => path_for_prefix_check(&resolved)
                .starts_with(path_for_prefix_check(&self.boundary)),
            Err(e) => {
                warn!(path = %candidate, error = %e, "Path resolution failed; denying");
                false
            }
        }
    }

    pub fn denial_message(&self) -> String {
        format!(
            "Error: Access denied. File operations are restricted to the working directory: {}",
            self.boundary.display()
        )
    }

    /// First path-like string in `args` that falls outside the boundary.
    ///
    /// Array elements are positional arguments, object values keyed ones;
    /// both are walked recursively. A top-level key listed in `path_args`
    /// is checked even without a separator.
    pub fn find_violation<'a>(&self, args: &'a Value, path_args: &[&str]) -> Option<&'a str> {
        if let Value::Object(map) = args {
            for key in path_args {
                if let Some(Value::String(s)) = map.get(*key) {
                    if !self.is_path_allowed(s) {
                        return Some(s.as_str());
                    }
                }
            }
        }
        self.scan(args)
    }

    fn scan<'a>(&self, value: &'a Value) -> Option<&'a str> {
        match value {
            Value::String(s) if looks_like_path(s) && !self.is_path_allowed(s) => Some(s.as_str()),
            Value::Array(items) => items.iter().find_map(|v| self.scan(v)),
            Value::Object(map) => map.values().find_map(|v| self.scan(v)),
            _ => None,
        }
    }

    /// Wrap `tool` in a new descriptor that checks paths before delegating.
    pub fn wrap(self: &Arc<Self>, tool: Arc<dyn DynTool>) -> GuardedTool {
        GuardedTool {
            inner: tool,
            guard: Arc::clone(self),
        }
    }

    /// Wrap every tool of `registry`, producing a new registry.
    pub fn wrap_registry(self: &Arc<Self>, registry: ToolRegistry) -> anyhow::Result<ToolRegistry> {
        let mut guarded = ToolRegistry::new();
        for tool in registry.into_tools() {
            guarded.register(Arc::new(self.wrap(tool)))?;
        }
        Ok(guarded)
    }
}

/// A tool whose calls are checked against a [`PathGuard`] first.
pub struct GuardedTool {
    inner: Arc<dyn DynTool>,
    guard: Arc<PathGuard>,
}

impl GuardedTool {
    pub fn inner(&self) -> &Arc<dyn DynTool> {
        &self.inner
    }
}

#[async_trait::async_trait]
impl DynTool for GuardedTool {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters_schema(&self) -> Value {
        self.inner.parameters_schema()
    }

    fn path_arguments(&self) -> &[&'static str] {
        self.inner.path_arguments()
    }

    async fn call(&self, args: Value) -> anyhow::Result<String> {
        if let Some(path) = self.guard.find_violation(&args, self.inner.path_arguments()) {
            warn!(
                tool_name = %self.inner.name(),
                path = %path,
                boundary = %self.guard.boundary().display(),
                "Tool path outside working directory; access denied"
            );
            return Ok(self.guard.denial_message());
        }
        self.inner.call(args).await
    }
}
