//! Error types for nsyncconfig

use std::path::PathBuf;

/// Errors raised while loading or validating the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Source #{0} has an empty name")]
    EmptySourceName(usize),

    #[error("Invalid source name '{0}': path separators are not allowed")]
    InvalidSourceName(String),

    #[error("Duplicate source name: {0}")]
    DuplicateSource(String),

    #[error("Source '{0}' has an empty path")]
    EmptySourcePath(String),

    #[error("Source '{name}' path must be absolute: {}", path.display())]
    RelativeSourcePath { name: String, path: PathBuf },

    #[error("Source '{0}': recently_added_days must be a positive integer")]
    InvalidRecentDays(String),

    #[error("covers.capacity must be at least 1")]
    ZeroCoverCapacity,

    #[error("Unknown log level: {0}")]
    InvalidLogLevel(String),
}

/// Result type for nsyncconfig
pub type Result<T> = std::result::Result<T, ConfigError>;
