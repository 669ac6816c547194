//! Pipeline log helpers.
//!
//! Thin wrappers over `tracing` so pipeline steps read as a checklist:
//! plain progress lines, successes, warnings, errors, optionally indented
//! under a heading. The binary installs a stderr subscriber with
//! [`init_logging`]; library users may install their own.

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Log level for pipeline messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

fn emit(level: LogLevel, message: &str, indent: u8) {
    let pad = "   ".repeat(indent as usize);
    match level {
        LogLevel::Info => info!("{}{}", pad, message),
        LogLevel::Success => info!(outcome = "success", "{}✓ {}", pad, message),
        LogLevel::Warning => warn!("{}{}", pad, message),
        LogLevel::Error => error!("{}{}", pad, message),
    }
}

pub fn log_info(msg: impl Into<String>) {
    emit(LogLevel::Info, &msg.into(), 0);
}

pub fn log_success(msg: impl Into<String>) {
    emit(LogLevel::Success, &msg.into(), 0);
}

pub fn log_warning(msg: impl Into<String>) {
    emit(LogLevel::Warning, &msg.into(), 0);
}

pub fn log_error(msg: impl Into<String>) {
    emit(LogLevel::Error, &msg.into(), 0);
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    emit(LogLevel::Info, &msg.into(), indent);
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    emit(LogLevel::Warning, &msg.into(), indent);
}

/// Default filter directive for a `-v` count.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install a stderr fmt subscriber.
///
/// `RUST_LOG` wins over the verbosity-derived level when set.
pub fn init_logging(verbosity: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), "info");
        assert_eq!(level_for_verbosity(1), "debug");
        assert_eq!(level_for_verbosity(5), "trace");
    }

    #[test]
    fn test_helpers_without_subscriber() {
        log_info("plain");
        log_success("done");
        log_info_indent("nested", 2);
        log_warning("careful");
        log_error("broken");
    }
}
