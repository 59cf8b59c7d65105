//! # NSync Configuration Module
//!
//! This module provides configuration management for NSync, including:
//! - Loading configuration from a YAML (or legacy JSON) file
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Eager validation into a strongly-typed [`Config`]
//!
//! ## Usage
//!
//! ```no_run
//! use nsyncconfig::Config;
//!
//! let config = Config::load(None)?;
//! println!("HTTP port: {}", config.host.http_port);
//! for source in &config.sources {
//!     println!("{} -> {}", source.name, source.path.display());
//! }
//! # Ok::<(), nsyncconfig::ConfigError>(())
//! ```

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::{
    collections::HashSet,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

mod error;

pub use error::{ConfigError, Result};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("nsync.yaml");

const ENV_CONFIG_DIR: &str = "NSYNC_CONFIG";
const LEGACY_ENV_CONFIG_DIR: &str = "CONFIG_DIR";
const ENV_PREFIX: &str = "NSYNC_CONFIG__";
const CONFIG_DIR_NAME: &str = ".nsync";
const CONFIG_FILES: [&str; 2] = ["config.yaml", "config.json"];

/// Environment variables inherited from the first deployments, mapped to their
/// place in the configuration tree.
const LEGACY_ENV_VARS: [(&str, &[&str]); 5] = [
    ("PORT", &["host", "http_port"]),
    ("BIND_ADDRESS", &["host", "bind_address"]),
    ("PLAYLIST_DIR", &["playlists", "directory"]),
    ("LOG_LEVEL", &["host", "logger", "min_level"]),
    ("WATCH_INTERVAL", &["playlists", "watch_interval_secs"]),
];

/// Top-level keys of the legacy `config.json`, moved to their nested homes.
const LEGACY_KEYS: [(&str, &[&str]); 3] = [
    ("playlist_dir", &["playlists", "directory"]),
    ("include_artwork", &["playlists", "include_artwork"]),
    ("watch_interval", &["playlists", "watch_interval_secs"]),
];

const LOG_LEVELS: [&str; 7] = [
    "ERROR", "WARN", "WARNING", "CRITICAL", "INFO", "DEBUG", "TRACE",
];

/// Complete NSync configuration
///
/// Built once at startup by [`Config::load`] and then shared read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: HostConfig,
    pub playlists: PlaylistsConfig,
    pub covers: CoversConfig,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// HTTP listener and logger settings
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub bind_address: String,
    pub http_port: u16,
    pub logger: LoggerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    pub min_level: String,
    pub enable_console: bool,
}

/// Where playlists are written and how they are kept in sync
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistsConfig {
    pub directory: PathBuf,
    pub include_artwork: bool,
    pub watch_interval_secs: u64,
}

impl PlaylistsConfig {
    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs.max(1))
    }
}

/// In-memory artwork cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct CoversConfig {
    /// Maximum number of directories kept in the cache
    pub capacity: usize,
    /// Entry lifetime in seconds, `0` keeps entries until evicted
    pub ttl_secs: u64,
}

impl CoversConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

/// One library root mapped to one playlist
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    /// Playlist name, the file is written as `<name>.m3u8`
    pub name: String,
    /// Absolute directory scanned for audio files
    pub path: PathBuf,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// Only keep files modified during the last N days, newest first
    #[serde(default)]
    pub recently_added_days: Option<u32>,
}

fn default_recursive() -> bool {
    true
}

impl Config {
    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external `config.yaml` (or `config.json`) if present
    /// 4. Applies environment variable overrides
    /// 5. Deserializes and validates the result
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory containing the config file, or `None` to search the usual places
    pub fn load(directory: Option<&Path>) -> Result<Self> {
        let mut value = Self::default_value()?;

        match Self::find_config_dir(directory) {
            Some(config_dir) => {
                info!(config_dir=%config_dir.display(), "Using config directory");
                match Self::read_config_file(&config_dir)? {
                    Some(external) => merge_yaml(&mut value, &Self::normalize(external)),
                    None => info!(
                        config_dir=%config_dir.display(),
                        "Config file not found, using default embedded config"
                    ),
                }
            }
            None => info!("No config directory found, using default embedded config"),
        }

        apply_env_overrides(&mut value, env::vars());
        Self::from_value(value)
    }

    /// Builds a configuration from YAML text merged over the embedded defaults
    ///
    /// Environment variables are not consulted.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value = Self::default_value()?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut value, &Self::normalize(external));
        Self::from_value(value)
    }

    /// Returns the source producing the playlist `name`
    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Checks every invariant the rest of the application relies on
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();

        for (index, source) in self.sources.iter().enumerate() {
            let name = source.name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptySourceName(index));
            }
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ConfigError::InvalidSourceName(source.name.clone()));
            }
            if !names.insert(source.name.as_str()) {
                return Err(ConfigError::DuplicateSource(source.name.clone()));
            }
            if source.path.as_os_str().is_empty() {
                return Err(ConfigError::EmptySourcePath(source.name.clone()));
            }
            if !source.path.is_absolute() {
                return Err(ConfigError::RelativeSourcePath {
                    name: source.name.clone(),
                    path: source.path.clone(),
                });
            }
            if source.recently_added_days == Some(0) {
                return Err(ConfigError::InvalidRecentDays(source.name.clone()));
            }
        }

        if self.covers.capacity == 0 {
            return Err(ConfigError::ZeroCoverCapacity);
        }

        let level = self.host.logger.min_level.to_uppercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(
                self.host.logger.min_level.clone(),
            ));
        }

        Ok(())
    }

    fn default_value() -> Result<Value> {
        Ok(lower_keys_value(serde_yaml::from_str(DEFAULT_CONFIG)?))
    }

    fn from_value(value: Value) -> Result<Self> {
        let config: Config = serde_yaml::from_value(value)?;
        config.validate()?;
        debug!(sources = config.sources.len(), "Configuration loaded");
        Ok(config)
    }

    fn normalize(external: Value) -> Value {
        let mut value = lower_keys_value(external);
        apply_legacy_keys(&mut value);
        value
    }

    /// Finds a config directory by trying different locations in order
    ///
    /// 1. The provided `directory` parameter
    /// 2. The `NSYNC_CONFIG` then `CONFIG_DIR` environment variables
    /// 3. `.nsync` in the current directory
    /// 4. `.nsync` in the user's home directory
    fn find_config_dir(directory: Option<&Path>) -> Option<PathBuf> {
        if let Some(dir) = directory {
            return Some(dir.to_path_buf());
        }

        for var in [ENV_CONFIG_DIR, LEGACY_ENV_CONFIG_DIR] {
            if let Ok(env_path) = env::var(var) {
                if !env_path.is_empty() {
                    info!(env_var = var, path=%env_path, "Trying to load config from env");
                    return Some(PathBuf::from(env_path));
                }
            }
        }

        let local = Path::new(CONFIG_DIR_NAME);
        if local.is_dir() {
            return Some(local.to_path_buf());
        }

        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .filter(|dir| dir.is_dir())
    }

    fn read_config_file(config_dir: &Path) -> Result<Option<Value>> {
        for file_name in CONFIG_FILES {
            let path = config_dir.join(file_name);
            if !path.is_file() {
                continue;
            }
            let data = fs::read(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            info!(config_file=%path.display(), "Loaded config file");
            return Ok(Some(serde_yaml::from_slice(&data)?));
        }
        Ok(None)
    }
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default ones.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (d, e) => *d = e.clone(),
    }
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> bool {
    let Some((first, rest)) = path.split_first() else {
        *data = value;
        return true;
    };
    let Value::Mapping(map) = data else {
        return false;
    };
    let key = Value::String(first.to_lowercase());
    if rest.is_empty() {
        map.insert(key, value);
        true
    } else {
        let entry = map
            .entry(key)
            .or_insert(Value::Mapping(Mapping::new()));
        set_value_internal(entry, rest, value)
    }
}

fn apply_legacy_keys(config: &mut Value) {
    let Value::Mapping(map) = config else {
        return;
    };
    let moved: Vec<(&[&str], Value)> = LEGACY_KEYS
        .iter()
        .filter_map(|(key, path)| {
            map.remove(Value::String((*key).to_string()))
                .map(|v| (*path, v))
        })
        .collect();
    for (path, value) in moved {
        set_value_internal(config, path, value);
    }
}

/// Applies `NSYNC_CONFIG__A__B=value` overrides and the legacy variables
///
/// Variables are passed explicitly so the logic can be exercised without
/// touching the process environment.
fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(suffix) = key.strip_prefix(ENV_PREFIX) {
            let key_path = suffix.split("__").collect::<Vec<_>>();
            set_value_internal(config, &key_path, convert_env_value(&value));
        } else if let Some((_, path)) = LEGACY_ENV_VARS.iter().find(|(name, _)| *name == key) {
            set_value_internal(config, path, convert_env_value(&value));
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    match serde_yaml::from_str::<Value>(value) {
        Ok(parsed @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => parsed,
        _ => Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Value {
        Config::default_value().unwrap()
    }

    #[test]
    fn test_env_override_nested_key() {
        let mut value = defaults();
        apply_env_overrides(
            &mut value,
            vec![("NSYNC_CONFIG__HOST__HTTP_PORT".to_string(), "9000".to_string())],
        );
        let config: Config = serde_yaml::from_value(value).unwrap();
        assert_eq!(config.host.http_port, 9000);
    }

    #[test]
    fn test_legacy_env_vars() {
        let mut value = defaults();
        apply_env_overrides(
            &mut value,
            vec![
                ("PLAYLIST_DIR".to_string(), "/srv/playlists".to_string()),
                ("WATCH_INTERVAL".to_string(), "60".to_string()),
                ("UNRELATED".to_string(), "x".to_string()),
            ],
        );
        let config: Config = serde_yaml::from_value(value).unwrap();
        assert_eq!(config.playlists.directory, PathBuf::from("/srv/playlists"));
        assert_eq!(config.playlists.watch_interval_secs, 60);
    }

    #[test]
    fn test_env_value_keeps_strings_with_colons() {
        assert_eq!(
            convert_env_value("0.0.0.0"),
            Value::String("0.0.0.0".to_string())
        );
        assert_eq!(convert_env_value("a: b"), Value::String("a: b".to_string()));
    }

    #[test]
    fn test_merge_keeps_unset_defaults() {
        let mut value = defaults();
        let external: Value = serde_yaml::from_str("host:\n  http_port: 1234\n").unwrap();
        merge_yaml(&mut value, &external);
        let config: Config = serde_yaml::from_value(value).unwrap();
        assert_eq!(config.host.http_port, 1234);
        assert_eq!(config.host.bind_address, "0.0.0.0");
    }
}
