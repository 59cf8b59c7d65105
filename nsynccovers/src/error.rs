//! Types d'erreurs pour nsynccovers

use std::path::PathBuf;

/// Erreurs du cache de couvertures
#[derive(Debug, thiserror::Error)]
pub enum CoversError {
    #[error("Cannot read artwork {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Type Result spécialisé pour nsynccovers
pub type Result<T> = std::result::Result<T, CoversError>;
