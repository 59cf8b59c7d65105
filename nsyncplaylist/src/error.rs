//! Types d'erreurs pour nsyncplaylist

use std::path::PathBuf;

/// Erreurs de gestion de playlist
#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("Playlist source not found: {0}")]
    SourceNotFound(String),

    #[error("Invalid playlist name: {0}")]
    InvalidName(String),

    #[error("Cannot read playlist {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write playlist {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Type Result spécialisé pour nsyncplaylist
pub type Result<T> = std::result::Result<T, PlaylistError>;
