//! Logging setup: optional rolling file logs plus stderr output.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Holds the non-blocking writer guards. Must stay alive for the duration
/// of the program or pending log writes are lost on exit.
#[must_use = "Dropping this guard stops log flushing - keep it alive for the program's lifetime"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    _stderr_guard: Option<WorkerGuard>,
}

/// Initialize the tracing subscriber from configuration.
pub fn init_logging(config: &LoggingConfig, project_root: &Path) -> Result<LoggingGuard> {
    let mut file_guard = None;
    let mut stderr_guard = None;

    let file_layer = if config.enabled {
        let log_dir = if config.directory.is_absolute() {
            config.directory.clone()
        } else {
            project_root.join(&config.directory)
        };
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let appender =
            RollingFileAppender::new(parse_rotation(&config.rotation), &log_dir, &config.file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        file_guard = Some(guard);

        Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(parse_level(&config.level)),
        )
    } else {
        None
    };

    let stderr_layer = if config.stderr {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("patentrag=info"));
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        stderr_guard = Some(guard);

        Some(
            fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_filter(filter),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to initialize logging subscriber")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        _stderr_guard: stderr_guard,
    })
}

fn parse_level(level: &str) -> EnvFilter {
    let directive = match level.to_lowercase().as_str() {
        "trace" => "patentrag=trace",
        "debug" => "patentrag=debug",
        "info" => "patentrag=info",
        "warn" => "patentrag=warn",
        "error" => "patentrag=error",
        other => {
            eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", other);
            "patentrag=info"
        }
    };
    EnvFilter::new(directive)
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation.to_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        "minutely" => Rotation::MINUTELY,
        "never" => Rotation::NEVER,
        other => {
            eprintln!(
                "Warning: Unknown rotation strategy '{}', defaulting to 'daily'",
                other
            );
            Rotation::DAILY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        let filter = parse_level("debug");
        assert!(filter.to_string().contains("debug"));

        let filter = parse_level("WARN");
        assert!(filter.to_string().contains("warn"));

        // Invalid level defaults to info
        let filter = parse_level("loud");
        assert!(filter.to_string().contains("info"));
    }

    #[test]
    fn test_parse_rotation_accepts_known_values() {
        // Rotation has no PartialEq, just verify no panic
        let _ = parse_rotation("daily");
        let _ = parse_rotation("hourly");
        let _ = parse_rotation("never");
        let _ = parse_rotation("weekly"); // defaults to daily
    }
}
