//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and
//! `HL_*` environment variables, and merging configurations with proper
//! precedence rules.

use crate::error::LookupError;
use crate::types::{ReportFormat, MAX_CACHE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// queue_capacity = 200
/// max_producers = 4
/// jitter = "250us"
/// timeout = "5s"
/// format = "json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for run settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Concurrent admissions into the work queue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,

    /// Producer tasks reading files at once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_producers: Option<usize>,

    /// Resolution cache pre-sizing hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,

    /// Longest accepted host name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_name_length: Option<usize>,

    /// Resolver start-up jitter (e.g. "100us", "2ms")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter: Option<String>,

    /// Per-lookup timeout (e.g. "5s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Report format ("text" or "json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which files were used
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::ConfigError` if the file is missing, unreadable,
    /// not valid TOML, or holds out-of-range values.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, LookupError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LookupError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LookupError::config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            LookupError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is the lowest precedence, then the home directory file,
    /// then a file in the current directory.
    pub fn discover_and_load(&self) -> Result<FileConfig, LookupError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => warn!("Ignoring config file {}: {}", path.display(), e),
            }
        }

        if self.verbose {
            for path in &loaded_files {
                info!("Loaded config file {}", path.display());
            }
        }

        Ok(merged_config)
    }

    /// Look for a configuration file in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./host-lookup.toml", "./.host-lookup.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Look for a configuration file in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".host-lookup.toml", "host-lookup.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follow the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("host-lookup").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations; values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        let defaults = match (lower.defaults, higher.defaults) {
            (Some(lower), Some(higher)) => Some(DefaultsConfig {
                queue_capacity: higher.queue_capacity.or(lower.queue_capacity),
                max_producers: higher.max_producers.or(lower.max_producers),
                cache_capacity: higher.cache_capacity.or(lower.cache_capacity),
                max_name_length: higher.max_name_length.or(lower.max_name_length),
                jitter: higher.jitter.or(lower.jitter),
                timeout: higher.timeout.or(lower.timeout),
                format: higher.format.or(lower.format),
            }),
            (lower, higher) => higher.or(lower),
        };
        FileConfig { defaults }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), LookupError> {
        let Some(defaults) = &config.defaults else {
            return Ok(());
        };

        if let Some(capacity) = defaults.queue_capacity {
            if capacity == 0 || capacity > 10_000 {
                return Err(LookupError::config(
                    "queue_capacity must be between 1 and 10000",
                ));
            }
        }

        if let Some(producers) = defaults.max_producers {
            if producers == 0 || producers > 100 {
                return Err(LookupError::config(
                    "max_producers must be between 1 and 100",
                ));
            }
        }

        if let Some(capacity) = defaults.cache_capacity {
            if capacity == 0 || capacity > MAX_CACHE_CAPACITY {
                return Err(LookupError::config(format!(
                    "cache_capacity must be between 1 and {}",
                    MAX_CACHE_CAPACITY
                )));
            }
        }

        if defaults.max_name_length == Some(0) {
            return Err(LookupError::config("max_name_length must be at least 1"));
        }

        for (key, value) in [("jitter", &defaults.jitter), ("timeout", &defaults.timeout)] {
            if let Some(value) = value {
                if parse_duration_string(value).is_none() {
                    return Err(LookupError::config(format!(
                        "Invalid {} format '{}'. Use format like '100us', '5ms', '30s', '2m'",
                        key, value
                    )));
                }
            }
        }

        if let Some(format) = &defaults.format {
            format.parse::<ReportFormat>().map_err(LookupError::config)?;
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub queue_capacity: Option<usize>,
    pub max_producers: Option<usize>,
    pub timeout: Option<Duration>,
    pub format: Option<ReportFormat>,
    pub config: Option<String>,
}

/// Load configuration from `HL_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    let mut env_config = EnvConfig::default();

    if let Ok(val) = env::var("HL_QUEUE_CAPACITY") {
        match val.parse::<usize>() {
            Ok(capacity) if (1..=10_000).contains(&capacity) => {
                env_config.queue_capacity = Some(capacity);
                if verbose {
                    info!("Using HL_QUEUE_CAPACITY={}", capacity);
                }
            }
            _ => warn!("Invalid HL_QUEUE_CAPACITY='{}', must be 1-10000", val),
        }
    }

    if let Ok(val) = env::var("HL_MAX_PRODUCERS") {
        match val.parse::<usize>() {
            Ok(producers) if (1..=100).contains(&producers) => {
                env_config.max_producers = Some(producers);
                if verbose {
                    info!("Using HL_MAX_PRODUCERS={}", producers);
                }
            }
            _ => warn!("Invalid HL_MAX_PRODUCERS='{}', must be 1-100", val),
        }
    }

    if let Ok(val) = env::var("HL_TIMEOUT") {
        match parse_duration_string(&val) {
            Some(timeout) => {
                env_config.timeout = Some(timeout);
                if verbose {
                    info!("Using HL_TIMEOUT={}", val);
                }
            }
            None => warn!("Invalid HL_TIMEOUT='{}', use format like '5s' or '2m'", val),
        }
    }

    if let Ok(val) = env::var("HL_FORMAT") {
        match val.parse::<ReportFormat>() {
            Ok(format) => {
                env_config.format = Some(format);
                if verbose {
                    info!("Using HL_FORMAT={}", format);
                }
            }
            Err(e) => warn!("Invalid HL_FORMAT: {}", e),
        }
    }

    if let Ok(path) = env::var("HL_CONFIG") {
        if !path.trim().is_empty() {
            env_config.config = Some(path);
        }
    }

    env_config
}

/// Parse a duration like "250us", "5ms", "30s", "2m" or a bare number of
/// seconds.
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: u64 = number.parse().ok()?;

    match unit.trim() {
        "" | "s" => Some(Duration::from_secs(number)),
        "us" => Some(Duration::from_micros(number)),
        "ms" => Some(Duration::from_millis(number)),
        "m" => Some(Duration::from_secs(number.checked_mul(60)?)),
        _ => None,
    }
}
