//! Logging setup for finrag
//!
//! Console output goes to stderr so command output on stdout stays
//! pipeable. A second layer writes a daily rolling file without ANSI colors.

use std::path::Path;

use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::AppConfig;
use crate::Result;

const DEFAULT_LOG_DIR: &str = "logs";
const LOG_FILE: &str = "finrag.log";

/// Dependencies that are chatty at debug level
const QUIET_TARGETS: &[&str] = &["sqlx", "hyper", "reqwest", "ort", "h2"];

/// Filter directive for `level`, with dependency noise capped at warn
pub fn filter_directive(level: &str) -> String {
    let mut directive = format!("{level},finrag={level}");
    for target in QUIET_TARGETS {
        directive.push_str(&format!(",{target}=warn"));
    }
    directive
}

/// Initialize logging from `RUST_LOG`, defaulting to info
pub fn init_logging() -> Result<()> {
    init_logging_with_config(None)
}

/// Initialize logging with configuration
///
/// `RUST_LOG` takes precedence over `logging.level` when set.
pub fn init_logging_with_config(config: Option<&AppConfig>) -> Result<()> {
    let level = config.map_or("info", |c| c.logging.level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    let directory = config.map_or(DEFAULT_LOG_DIR, |c| c.logging.directory.as_str());
    if config.is_some_and(|c| c.logging.backtrace) && std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    install(env_filter, level, directory)
}

/// Initialize logging with custom log level, ignoring `RUST_LOG`
pub fn init_logging_with_level(level: &str) -> Result<()> {
    install(EnvFilter::new(filter_directive(level)), level, DEFAULT_LOG_DIR)
}

fn install(env_filter: EnvFilter, level: &str, directory: &str) -> Result<()> {
    std::fs::create_dir_all(Path::new(directory))?;

    let file_appender = tracing_appender::rolling::daily(directory, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!("Logging initialized at {level}, file output in {directory}/{LOG_FILE}.YYYY-MM-DD");

    // The writer thread must outlive main
    std::mem::forget(guard);

    Ok(())
}

/// Initialize simple logging for testing
pub fn init_simple_logging() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();

    Ok(())
}
