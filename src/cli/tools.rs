//! Tools command - show the guarded toolset.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::guard::PathGuard;
use crate::logging;
use crate::tools::filesystem;

pub async fn cmd_tools() -> Result<()> {
    logging::init_simple_logging();

    let guard = Arc::new(PathGuard::establish().context("resolving the working directory")?);
    let tools = guard.wrap_registry(filesystem::file_toolset(guard.boundary())?)?;

    println!("Working directory: {}", guard.boundary().display());
    for info in tools.list_tools() {
        println!("  {:<12} {}", info.name, info.description);
    }
    Ok(())
}
