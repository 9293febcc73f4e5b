//! Application configuration loaded from environment variables, layered over
//! an optional TOML file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use ads_infra::MongoConfig;
use thiserror::Error;

use crate::telemetry::TelemetryConfig;

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Time allowed for a client to send request headers.
    pub read_timeout: Duration,
    /// Time allowed for a client to accept a response before disconnect.
    pub write_timeout: Duration,
    /// Keep-alive for idle connections.
    pub idle_timeout: Duration,
    /// Upper bound on draining in-flight requests at shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3131,
            read_timeout: Duration::from_secs(3),
            write_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(6),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mongo: MongoConfig,
    pub telemetry: TelemetryConfig,
}

/// Config file read when `CONFIG_PATH` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "configs/configs.toml";

/// File keys by section, and the environment variable each one stands in for.
const FILE_KEYS: &[(&str, &str, &str)] = &[
    ("server", "host", "APP_IP"),
    ("server", "port", "APP_PORT"),
    ("server", "read-timeout", "READ_TIMEOUT"),
    ("server", "write-timeout", "WRITE_TIMEOUT"),
    ("server", "idle-timeout", "IDLE_TIMEOUT"),
    ("server", "shutdown-timeout", "SHUTDOWN_TIMEOUT"),
    ("mongo", "conn-str", "MONGO_CONN_STR"),
    ("mongo", "host", "MONGO_HOST_DB"),
    ("mongo", "port", "MONGO_PORT_DB"),
    ("mongo", "username", "MONGO_USER"),
    ("mongo", "password", "MONGO_PASSWORD"),
    ("mongo", "db-name", "MONGO_DB_NAME"),
    ("mongo", "collection-name", "MONGO_COLLECTION_NAME"),
    ("mongo", "conn-attempts", "MONGO_CONN_ATTEMPTS"),
    ("mongo", "conn-timeout", "MONGO_TIMEOUT"),
    ("log", "format", "LOG_FORMAT"),
    ("log", "file", "LOG_FILE"),
];

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config key {0} must be a string, number or boolean")]
    InvalidValue(String),
}

/// Values from the config file, keyed by the environment variable they back.
#[derive(Debug, Default, Clone)]
pub struct FileSettings {
    values: HashMap<&'static str, String>,
}

impl FileSettings {
    /// Parse a TOML document with `[server]`, `[mongo]` and `[log]` tables.
    /// Unknown sections and keys are ignored.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(raw)?;
        let mut values = HashMap::new();

        for (section, key, var) in FILE_KEYS {
            let Some(value) = table
                .get(*section)
                .and_then(|s| s.as_table())
                .and_then(|s| s.get(*key))
            else {
                continue;
            };
            let text = match value {
                toml::Value::String(v) => v.clone(),
                toml::Value::Integer(v) => v.to_string(),
                toml::Value::Float(v) => v.to_string(),
                toml::Value::Boolean(v) => v.to_string(),
                _ => return Err(ConfigError::InvalidValue(format!("{section}.{key}"))),
            };
            values.insert(*var, text);
        }

        Ok(Self { values })
    }

    /// Read `path`. A missing file yields empty settings unless `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn get(&self, var: &str) -> Option<String> {
        self.values.get(var).cloned()
    }
}

impl AppConfig {
    /// Load configuration from environment variables over the config file.
    ///
    /// The file is `CONFIG_PATH` (which must then exist) or
    /// [`DEFAULT_CONFIG_PATH`] if present. Non-empty environment values win.
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = match env::var("CONFIG_PATH") {
            Ok(path) if !path.is_empty() => FileSettings::load(Path::new(&path), true)?,
            _ => FileSettings::load(Path::new(DEFAULT_CONFIG_PATH), false)?,
        };
        Ok(Self::layered(&file, |key| env::var(key).ok()))
    }

    /// Resolve each key from `lookup` first, then from the config file.
    pub fn layered(file: &FileSettings, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::from_lookup(|key| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .or_else(|| file.get(key))
        })
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let server_defaults = ServerConfig::default();
        let mongo_defaults = MongoConfig::default();

        let duration = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| parse_duration(&v))
                .unwrap_or(default)
        };
        let string = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let server = ServerConfig {
            host: string("APP_IP", &server_defaults.host),
            port: lookup("APP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(server_defaults.port),
            read_timeout: duration("READ_TIMEOUT", server_defaults.read_timeout),
            write_timeout: duration("WRITE_TIMEOUT", server_defaults.write_timeout),
            idle_timeout: duration("IDLE_TIMEOUT", server_defaults.idle_timeout),
            shutdown_timeout: duration("SHUTDOWN_TIMEOUT", server_defaults.shutdown_timeout),
        };

        let uri = lookup("MONGO_CONN_STR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "mongodb://{}:{}@{}:{}",
                    string("MONGO_USER", "admin"),
                    string("MONGO_PASSWORD", "password"),
                    string("MONGO_HOST_DB", "localhost"),
                    string("MONGO_PORT_DB", "27017"),
                )
            });

        let mongo = MongoConfig {
            uri,
            attempts: lookup("MONGO_CONN_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(mongo_defaults.attempts),
            timeout: duration("MONGO_TIMEOUT", mongo_defaults.timeout),
            database: string("MONGO_DB_NAME", &mongo_defaults.database),
            collection: string("MONGO_COLLECTION_NAME", &mongo_defaults.collection),
        };

        Self {
            server,
            mongo,
            telemetry: TelemetryConfig::from_lookup(&lookup),
        }
    }
}

/// Parse `500ms`, `3s`, `2m`, `1h` or a bare number of seconds.
fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let value: u64 = digits.parse().ok()?;

    match unit {
        "ms" => Some(Duration::from_millis(value)),
        "s" => Some(Duration::from_secs(value)),
        "m" => Some(Duration::from_secs(value.checked_mul(60)?)),
        "h" => Some(Duration::from_secs(value.checked_mul(3600)?)),
        _ => None,
    }
}
