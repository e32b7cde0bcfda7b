//! Configuration loading and constants.
//!
//! Configuration is assembled once at startup from three layers: built-in
//! defaults, an optional TOML file, and environment variables (highest
//! priority). The resulting `AppConfig` is immutable and handed explicitly to
//! the database pool, the queue probe and the HTTP router.

use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Environment Variables
// =============================================================================

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASS: &str = "DB_PASS";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_QUEUE_HOST: &str = "QUEUE_HOST";
pub const ENV_SYNTHETIC_LOAD_ELEMENTS: &str = "SYNTHETIC_LOAD_ELEMENTS";

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

pub const DEFAULT_DB_HOST: &str = "db-service";
pub const DEFAULT_DB_USER: &str = "root";
pub const DEFAULT_DB_PASS: &str = "MySuperSecret";
pub const DEFAULT_DB_NAME: &str = "testdb";
/// Standard MySQL port
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
/// How long a request waits for a pooled connection before failing
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_QUEUE_HOST: &str = "queue-service";
/// Standard AMQP 0-9-1 port
pub const DEFAULT_QUEUE_PORT: u16 = 5672;
pub const DEFAULT_QUEUE_PROBE_TIMEOUT_SECS: u64 = 10;

/// Number of integers held in memory to simulate memory pressure
pub const DEFAULT_SYNTHETIC_LOAD_ELEMENTS: usize = 10_000_000;
/// Upper bound on the synthetic load (8 GB of u64 values)
pub const MAX_SYNTHETIC_LOAD_ELEMENTS: usize = 1_000_000_000;

/// Default log filter when neither --log-level nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "probe_backend=info,tower_http=info";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener
    pub http: HttpServerConfig,
    /// MySQL connection settings
    pub database: DatabaseConfig,
    /// AMQP broker probed once at startup
    pub queue: QueueConfig,
    /// Synthetic memory load
    pub load: LoadConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
///
/// Not overridable from the environment: the port is fixed unless a config
/// file says otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database (schema) name
    pub name: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASS.to_string(),
            name: DEFAULT_DB_NAME.to_string(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            acquire_timeout_seconds: DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl DatabaseConfig {
    /// Connection target suitable for logs (no password).
    pub fn redacted(&self) -> String {
        format!("mysql://{}@{}:{}/{}", self.user, self.host, self.port, self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on the startup connection attempt
    pub probe_timeout_seconds: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_QUEUE_HOST.to_string(),
            port: DEFAULT_QUEUE_PORT,
            probe_timeout_seconds: DEFAULT_QUEUE_PROBE_TIMEOUT_SECS,
        }
    }
}

impl QueueConfig {
    /// AMQP URI using the broker's default credentials and the `/` vhost.
    pub fn uri(&self) -> String {
        format!("amqp://{}:{}/%2f", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Number of integers to allocate; 0 disables the allocation
    pub elements: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            elements: DEFAULT_SYNTHETIC_LOAD_ELEMENTS,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    /// Load configuration from an optional TOML file and the process environment.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        let contents = match path {
            Some(path) => Some(std::fs::read_to_string(path)?),
            None => None,
        };
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Merge defaults, file contents and an environment lookup, then validate.
    pub fn from_sources<F>(file: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(contents) => toml::from_str(contents)?,
            None => AppConfig::default(),
        };

        config.apply_env(lookup)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(host) = var(ENV_DB_HOST) {
            self.database.host = host;
        }
        if let Some(user) = var(ENV_DB_USER) {
            self.database.user = user;
        }
        if let Some(password) = var(ENV_DB_PASS) {
            self.database.password = password;
        }
        if let Some(name) = var(ENV_DB_NAME) {
            self.database.name = name;
        }
        if let Some(host) = var(ENV_QUEUE_HOST) {
            self.queue.host = host;
        }
        if let Some(raw) = var(ENV_SYNTHETIC_LOAD_ELEMENTS) {
            self.load.elements = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    key: ENV_SYNTHETIC_LOAD_ELEMENTS,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation("http.port must be non-zero".to_string()));
        }
        if self.database.host.trim().is_empty() {
            return Err(ConfigError::Validation("database.host must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.load.elements > MAX_SYNTHETIC_LOAD_ELEMENTS {
            return Err(ConfigError::Validation(format!(
                "load.elements must be at most {} (got {})",
                MAX_SYNTHETIC_LOAD_ELEMENTS, self.load.elements
            )));
        }
        if self.queue.host.trim().is_empty() {
            return Err(ConfigError::Validation("queue.host must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = AppConfig::from_sources(None, env(&[])).unwrap();

        assert_eq!(config.http.port, 8080);
        assert_eq!(config.database.host, "db-service");
        assert_eq!(config.database.user, "root");
        assert_eq!(config.database.password, "MySuperSecret");
        assert_eq!(config.database.name, "testdb");
        assert_eq!(config.queue.host, "queue-service");
        assert_eq!(config.load.elements, 10_000_000);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = AppConfig::from_sources(
            None,
            env(&[
                ("DB_HOST", "mysql.internal"),
                ("DB_USER", "app"),
                ("DB_PASS", "hunter2"),
                ("DB_NAME", "probe"),
                ("QUEUE_HOST", "rabbit.internal"),
                ("SYNTHETIC_LOAD_ELEMENTS", "42"),
            ]),
        )
        .unwrap();

        assert_eq!(config.database.host, "mysql.internal");
        assert_eq!(config.database.user, "app");
        assert_eq!(config.database.password, "hunter2");
        assert_eq!(config.database.name, "probe");
        assert_eq!(config.queue.host, "rabbit.internal");
        assert_eq!(config.load.elements, 42);
    }

    #[test]
    fn test_empty_environment_value_falls_back_to_default() {
        let config = AppConfig::from_sources(None, env(&[("DB_HOST", "")])).unwrap();
        assert_eq!(config.database.host, DEFAULT_DB_HOST);
    }

    #[test]
    fn test_port_is_not_read_from_environment() {
        let config = AppConfig::from_sources(None, env(&[("PORT", "9999")])).unwrap();
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
    }

    #[test]
    fn test_file_values_are_overridden_by_environment() {
        let file = r#"
            [http]
            port = 3000

            [database]
            host = "from-file"
            acquire_timeout_seconds = 1

            [queue]
            host = "queue-from-file"

            [logging]
            format = "json"
        "#;

        let config = AppConfig::from_sources(Some(file), env(&[("DB_HOST", "from-env")])).unwrap();

        assert_eq!(config.http.port, 3000);
        assert_eq!(config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.database.host, "from-env");
        assert_eq!(config.database.acquire_timeout_seconds, 1);
        assert_eq!(config.database.user, DEFAULT_DB_USER);
        assert_eq!(config.queue.host, "queue-from-file");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backend.toml");
        std::fs::write(&path, "[load]\nelements = 7\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert!(config.load.elements > 0);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = AppConfig::load(Some("/nonexistent/backend.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let err = AppConfig::from_sources(Some("[http]\nport = \"eighty\""), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_load_elements_is_rejected() {
        let err =
            AppConfig::from_sources(None, env(&[("SYNTHETIC_LOAD_ELEMENTS", "lots")])).unwrap_err();
        match err {
            ConfigError::InvalidEnv { key, value, .. } => {
                assert_eq!(key, ENV_SYNTHETIC_LOAD_ELEMENTS);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_oversized_load_fails_validation() {
        let err =
            AppConfig::from_sources(None, env(&[("SYNTHETIC_LOAD_ELEMENTS", "100000000000")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let config = AppConfig::from_sources(
            None,
            env(&[("SYNTHETIC_LOAD_ELEMENTS", &MAX_SYNTHETIC_LOAD_ELEMENTS.to_string())]),
        )
        .unwrap();
        assert_eq!(config.load.elements, MAX_SYNTHETIC_LOAD_ELEMENTS);
    }

    #[test]
    fn test_zero_port_fails_validation() {
        let err = AppConfig::from_sources(Some("[http]\nport = 0"), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_pool_size_fails_validation() {
        let err = AppConfig::from_sources(Some("[database]\nmax_connections = 0"), env(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_redacted_database_target_hides_password() {
        let db = DatabaseConfig::default();
        let target = db.redacted();
        assert_eq!(target, "mysql://root@db-service:3306/testdb");
        assert!(!target.contains(DEFAULT_DB_PASS));
    }

    #[test]
    fn test_queue_uri_uses_default_vhost() {
        let queue = QueueConfig {
            host: "rabbit".to_string(),
            ..Default::default()
        };
        assert_eq!(queue.uri(), "amqp://rabbit:5672/%2f");
    }
}
