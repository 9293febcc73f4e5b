//! Telemetry initialization and fatal-error reporting.

use std::error::Error;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILE: &str = "app.log";

/// Telemetry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Enable JSON logging (for production).
    pub json_logs: bool,
    /// Service name attached to the startup event.
    pub service_name: String,
    /// Also write JSON lines to this file, rotated daily.
    pub log_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            service_name: "ads-service".to_string(),
            log_file: None,
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from a key lookup (`LOG_FORMAT`, `SERVICE_NAME`, `LOG_FILE`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            json_logs: lookup("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "ads-service".to_string()),
            log_file: lookup("LOG_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Split a log file path into the rolling appender's directory and file prefix.
fn log_file_target(path: &Path) -> (PathBuf, PathBuf) {
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    (directory, file_name)
}

/// Initialize the tracing subscriber.
///
/// When a log file is configured the returned guard flushes it on drop and
/// must be held for the life of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ads_server=debug,ads_infra=debug"));

    let stdout_layer = if config.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().pretty().boxed()
    };

    let (file_layer, guard) = match config.log_file.as_deref() {
        Some(path) => {
            let (directory, file_name) = log_file_target(path);
            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        log_file = ?config.log_file,
        "Telemetry initialized"
    );
    guard
}

/// Record an unrecoverable error and terminate the process.
///
/// The log guard is flushed before exiting so the final event reaches the file.
pub fn fatal(message: &str, err: &dyn Error, log_guard: Option<WorkerGuard>) -> ! {
    tracing::error!(fatal = true, error = %err, "{}", message);
    drop(log_guard);
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_logs_are_opt_in() {
        let config = TelemetryConfig::from_lookup(|_| None);
        assert!(!config.json_logs);
        assert_eq!(config.service_name, "ads-service");

        let config = TelemetryConfig::from_lookup(|key| {
            (key == "LOG_FORMAT").then(|| "JSON".to_string())
        });
        assert!(config.json_logs);
    }

    #[test]
    fn file_output_is_enabled_by_log_file() {
        assert_eq!(TelemetryConfig::from_lookup(|_| None).log_file, None);
        assert_eq!(
            TelemetryConfig::from_lookup(|key| (key == "LOG_FILE").then(|| " ".to_string()))
                .log_file,
            None
        );

        let config = TelemetryConfig::from_lookup(|key| {
            (key == "LOG_FILE").then(|| "logs/app.log".to_string())
        });
        assert_eq!(config.log_file, Some(PathBuf::from("logs/app.log")));
    }

    #[test]
    fn log_file_splits_into_directory_and_prefix() {
        assert_eq!(
            log_file_target(Path::new("logs/app.log")),
            (PathBuf::from("logs"), PathBuf::from("app.log"))
        );
        assert_eq!(
            log_file_target(Path::new("app.log")),
            (PathBuf::from("."), PathBuf::from("app.log"))
        );
        assert_eq!(
            log_file_target(Path::new("/var/log/ads/service.log")),
            (PathBuf::from("/var/log/ads"), PathBuf::from("service.log"))
        );
        assert_eq!(
            log_file_target(Path::new("/")),
            (PathBuf::from("."), PathBuf::from(DEFAULT_LOG_FILE))
        );
    }
}
