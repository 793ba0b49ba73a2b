//! Application configuration structures.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::hosts::{HostConfig, HostsFile, validate_hosts};
use super::validation::{ConfigError, expand_env_vars, minutes_or_humantime, seconds_or_humantime};

// =============================================================================
// Constants
// =============================================================================

/// Default poll interval (1 minute).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Default cycle timeout (50 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(50);

/// Default wait for cancelled fetches to finalize (10 seconds).
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_secs(10);

/// Default admission gate capacity.
pub const DEFAULT_MAX_TASKS: usize = 16;

/// Default InfluxDB ping timeout (5 seconds).
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Default InfluxDB write timeout (10 seconds).
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_cancel_grace() -> Duration {
    DEFAULT_CANCEL_GRACE
}

fn default_max_tasks() -> usize {
    DEFAULT_MAX_TASKS
}

fn default_ping_timeout() -> Duration {
    DEFAULT_PING_TIMEOUT
}

fn default_write_timeout() -> Duration {
    DEFAULT_WRITE_TIMEOUT
}

fn default_fallback_dir() -> PathBuf {
    PathBuf::from("./spool")
}

// =============================================================================
// General Configuration
// =============================================================================

/// Scheduler settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Poll interval (default: 1m, bare integers are minutes).
    #[serde(default = "default_interval", deserialize_with = "minutes_or_humantime")]
    pub interval: Duration,

    /// Cycle timeout after which running fetches are cancelled (default: 50s,
    /// bare integers are seconds).
    #[serde(default = "default_timeout", deserialize_with = "seconds_or_humantime")]
    pub timeout: Duration,

    /// How long to wait for cancelled fetches before detaching them (default: 10s).
    #[serde(default = "default_cancel_grace", deserialize_with = "seconds_or_humantime")]
    pub cancel_grace: Duration,

    /// Maximum concurrently running fetch tasks (default: 16).
    #[serde(default = "default_max_tasks")]
    pub max_tasks: usize,

    /// Verbose per-cycle and per-feature logging.
    #[serde(default)]
    pub debug: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            cancel_grace: DEFAULT_CANCEL_GRACE,
            max_tasks: DEFAULT_MAX_TASKS,
            debug: false,
        }
    }
}

// =============================================================================
// Sink Configuration
// =============================================================================

/// InfluxDB 1.x HTTP endpoint.
#[derive(Clone, Deserialize)]
pub struct InfluxConfig {
    /// Base URL, `${VAR}` expanded (e.g. `http://127.0.0.1:8086`).
    pub url: String,

    /// Target database.
    pub database: String,

    /// Basic-auth user, `${VAR}` expanded.
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password, `${VAR}` expanded.
    #[serde(default)]
    pub password: Option<String>,

    /// `/ping` timeout (default: 5s).
    #[serde(default = "default_ping_timeout", with = "humantime_serde")]
    pub ping_timeout: Duration,

    /// `/write` timeout (default: 10s).
    #[serde(default = "default_write_timeout", with = "humantime_serde")]
    pub write_timeout: Duration,
}

impl std::fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("ping_timeout", &self.ping_timeout)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

impl InfluxConfig {
    /// Create an endpoint config with default timeouts and no credentials.
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            username: None,
            password: None,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    fn expand(&mut self) {
        self.url = expand_env_vars(&self.url);
        self.username = self.username.as_deref().map(expand_env_vars).filter(|s| !s.is_empty());
        self.password = self.password.as_deref().map(expand_env_vars).filter(|s| !s.is_empty());
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.url).map_err(|e| {
            ConfigError::ValidationError(format!("invalid influx url '{}': {}", self.url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "influx url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "influx database must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where finished batches go.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Primary time-series store. Without it every batch is spooled locally.
    #[serde(default)]
    pub influx: Option<InfluxConfig>,

    /// Local fallback directory (default: "./spool").
    #[serde(default = "default_fallback_dir")]
    pub fallback_dir: PathBuf,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            influx: None,
            fallback_dir: default_fallback_dir(),
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Scheduler settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Sink settings.
    #[serde(default)]
    pub sink: SinkConfig,

    /// Path to a file or directory with additional host lists.
    #[serde(default)]
    pub hosts_path: Option<String>,

    /// Inline host list.
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse, expand and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(content)?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(content)?;
        config.expand();
        Ok(config)
    }

    /// Load configuration including `hosts_path` and an optional override.
    ///
    /// Hosts found under `hosts_path` (or `extra_hosts`, which takes
    /// precedence) are appended after the inline hosts. The merged list is
    /// validated once.
    pub fn load_with_hosts_path(
        path: impl AsRef<Path>,
        extra_hosts: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;

        let hosts_path = extra_hosts
            .map(Path::to_path_buf)
            .or_else(|| config.hosts_path.as_ref().map(PathBuf::from));
        if let Some(dir) = hosts_path {
            let mut additional = HostsFile::load(&dir)?.hosts;
            for host in &mut additional {
                host.expand_secrets();
            }
            tracing::info!(path = %dir.display(), count = additional.len(), "Loaded extra hosts");
            config.hosts.extend(additional);
        }

        config.validate()?;
        Ok(config)
    }

    fn expand(&mut self) {
        if let Some(influx) = &mut self.sink.influx {
            influx.expand();
        }
        for host in &mut self.hosts {
            host.expand_secrets();
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "general interval must be positive".to_string(),
            ));
        }
        if self.general.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "general timeout must be positive".to_string(),
            ));
        }
        if self.general.max_tasks == 0 {
            return Err(ConfigError::ValidationError(
                "general max_tasks must be at least 1".to_string(),
            ));
        }

        if let Some(influx) = &self.sink.influx {
            influx.validate()?;
        }

        validate_hosts(&self.hosts)?;

        for host in &self.hosts {
            let budget = host.snmp.request_budget();
            if budget >= self.general.timeout {
                tracing::warn!(
                    host = %host.ip,
                    budget_ms = budget.as_millis() as u64,
                    timeout_ms = self.general.timeout.as_millis() as u64,
                    "SNMP request budget reaches the cycle timeout; slow walks will finish late"
                );
            }
        }

        Ok(())
    }
}
