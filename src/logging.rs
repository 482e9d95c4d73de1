//! Structured logging setup.
//!
//! - JSON formatting for production
//! - Pretty formatting for development
//! - Optional file output with daily rotation

use anyhow::{Context, Result};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const SERVICE_NAME: &str = "postcoord-validator";

/// Configuration for logging setup.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log format: "json" or "pretty"
    pub format: LogFormat,
    /// Log output: "stdout", "stderr", or "file"
    pub output: LogOutput,
    /// Directory for log files (when output is "file")
    pub log_dir: PathBuf,
    /// Log file name prefix
    pub log_file_prefix: String,
    pub service_name: String,
    pub service_version: String,
    /// Environment (e.g., "dev", "staging", "production")
    pub environment: String,
    /// Rotate log files daily
    pub enable_rotation: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging (production)
    Json,
    /// Human-readable pretty output (development)
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

/// Log output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// File with rotation
    File,
}

impl LogOutput {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "stdout" => Some(LogOutput::Stdout),
            "stderr" => Some(LogOutput::Stderr),
            "file" => Some(LogOutput::File),
            _ => None,
        }
    }
}

fn is_production(environment: &str) -> bool {
    environment == "production" || environment == "prod"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string());

        Self {
            format: if is_production(&environment) {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            // stdout carries command output
            output: LogOutput::Stderr,
            log_dir: PathBuf::from("logs"),
            log_file_prefix: SERVICE_NAME.to_string(),
            service_name: SERVICE_NAME.to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment,
            enable_rotation: true,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            env::var("LOG_FORMAT").ok().as_deref(),
            env::var("LOG_OUTPUT").ok().as_deref(),
            env::var("LOG_DIR").ok(),
        )
    }

    /// Applies override values; unrecognised formats and outputs are ignored.
    pub fn with_overrides(mut self, format: Option<&str>, output: Option<&str>, log_dir: Option<String>) -> Self {
        if let Some(format) = format.and_then(LogFormat::parse) {
            self.format = format;
        }
        if let Some(output) = output.and_then(LogOutput::parse) {
            self.output = output;
        }
        if let Some(log_dir) = log_dir {
            self.log_dir = PathBuf::from(log_dir);
        }
        self
    }
}

/// Installs the global subscriber described by `config`.
///
/// Log lines go through a non-blocking writer; keep the returned guard alive
/// until the process exits or buffered lines are lost.
pub fn init_logging(config: LoggingConfig) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.environment));
    let (writer, guard) = log_writer(&config)?;

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE);
    let fmt_layer = match config.format {
        LogFormat::Json => fmt_layer.json().with_current_span(true).with_thread_ids(true).boxed(),
        LogFormat::Pretty => fmt_layer
            .pretty()
            .with_ansi(config.output != LogOutput::File)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = %config.environment,
        format = ?config.format,
        output = ?config.output,
        "logging initialized"
    );

    Ok(guard)
}

fn default_filter(environment: &str) -> EnvFilter {
    EnvFilter::new(if is_production(environment) { "info" } else { "debug" })
}

fn log_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    Ok(match config.output {
        LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
        LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
        LogOutput::File => {
            std::fs::create_dir_all(&config.log_dir)
                .with_context(|| format!("failed to create log directory {}", config.log_dir.display()))?;
            let appender = if config.enable_rotation {
                tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix)
            } else {
                tracing_appender::rolling::never(&config.log_dir, &config.log_file_prefix)
            };
            tracing_appender::non_blocking(appender)
        }
    })
}

/// Log a slow operation warning.
///
/// Durations above the threshold are logged at warn level, the rest at debug.
#[macro_export]
macro_rules! log_slow_operation {
    ($duration:expr, $threshold_ms:expr, $($arg:tt)*) => {
        {
            let duration_ms = $duration.as_millis() as u64;
            if duration_ms > $threshold_ms {
                tracing::warn!(
                    duration_ms = duration_ms,
                    threshold_ms = $threshold_ms,
                    $($arg)*
                );
            } else {
                tracing::debug!(
                    duration_ms = duration_ms,
                    $($arg)*
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_defaults() {
        let config = LoggingConfig::default().with_overrides(Some("JSON"), Some("stdout"), Some("/tmp/pc".into()));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stdout);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/pc"));
    }

    #[test]
    fn unknown_values_are_ignored() {
        let base = LoggingConfig::default();
        let config = base.clone().with_overrides(Some("xml"), Some("syslog"), None);
        assert_eq!(config.format, base.format);
        assert_eq!(config.output, LogOutput::Stderr);
        assert_eq!(config.service_name, "postcoord-validator");
    }

    #[test]
    fn file_output_creates_log_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_dir = dir.path().join("nested").join("logs");
        let config = LoggingConfig::default().with_overrides(None, Some("file"), Some(log_dir.display().to_string()));

        let (_writer, _guard) = log_writer(&config).unwrap();

        assert!(log_dir.is_dir());
    }
}
