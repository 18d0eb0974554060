//! Logging initialization and configuration.
//!
//! stdout carries chat replies, so log output goes to stderr and to a daily
//! rolling file under the log directory.

use anyhow::Result;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_subscriber::{Layer, Registry};

use crate::config::{log_dir_path, Config};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Initialize the logging system based on configuration.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging(cfg: &Config) -> Result<WorkerGuard> {
    let level = parse_log_level(&cfg.log.level)?;

    let log_dir = log_dir_path(cfg);
    std::fs::create_dir_all(&log_dir)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(cfg, level)));

    let format = cfg.log.format.to_lowercase();
    let suffix = if format == "json" { "json" } else { "log" };
    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("grok-cli")
        .filename_suffix(suffix)
        .build(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create rolling file appender: {}", e))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let layers: Vec<BoxedLayer> = vec![file_layer(&format, non_blocking), stderr_layer(&format)];
    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!(
        level = %cfg.log.level,
        format = %cfg.log.format,
        dir = %log_dir.display(),
        "Logging initialized"
    );
    Ok(guard)
}

/// Initialize stderr-only logging for commands that don't load config.
pub fn init_simple_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "grok_cli=warn".into()),
        )
        .try_init();
}

fn filter_directives(cfg: &Config, level: &str) -> String {
    let mut filter = format!("grok_cli={}", level);
    let mut modules: Vec<_> = cfg.log.module_levels.iter().collect();
    modules.sort();
    for (module, module_level) in modules {
        if let Ok(parsed) = parse_log_level(module_level) {
            filter.push_str(&format!(",{}={}", module, parsed));
        }
    }
    filter
}

fn file_layer(format: &str, writer: NonBlocking) -> BoxedLayer {
    match format {
        "json" => fmt::layer()
            .json()
            .with_writer(writer)
            .with_timer(ChronoUtc::rfc_3339())
            .with_target(true)
            .boxed(),
        "compact" => fmt::layer()
            .compact()
            .with_ansi(false)
            .with_writer(writer)
            .with_timer(ChronoLocal::new(LOCAL_TIME_FORMAT.to_string()))
            .boxed(),
        _ => fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_timer(ChronoLocal::new(LOCAL_TIME_FORMAT.to_string()))
            .boxed(),
    }
}

fn stderr_layer(format: &str) -> BoxedLayer {
    match format {
        "json" => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_timer(ChronoUtc::rfc_3339())
            .boxed(),
        _ => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_timer(ChronoLocal::new(LOCAL_TIME_FORMAT.to_string()))
            .boxed(),
    }
}

/// Parse log level string to a tracing directive level.
fn parse_log_level(level_str: &str) -> Result<&'static str> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" => Ok("warn"),
        "error" => Ok("error"),
        _ => anyhow::bail!("Invalid log level: {}", level_str),
    }
}
