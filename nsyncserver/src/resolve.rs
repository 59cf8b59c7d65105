//! Résolution des chemins demandés par les clients
//!
//! Les lecteurs transmettent parfois des noms dont la casse ne correspond
//! pas au disque (`cover.jpg` pour `Cover.JPG`). Le dernier composant est
//! alors recherché sans tenir compte de la casse dans le répertoire parent.

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Résout un chemin logique vers un chemin existant
///
/// # Retourne
///
/// - le chemin lui-même s'il existe ;
/// - sinon l'enfant du parent dont le nom correspond sans tenir compte de la
///   casse (le plus petit dans l'ordre des octets si plusieurs correspondent) ;
/// - `None` sinon, ou si le chemin n'est pas absolu ou contient `..`.
pub fn resolve_path(logical: &Path) -> Option<PathBuf> {
    if !logical.is_absolute()
        || logical
            .components()
            .any(|component| matches!(component, Component::ParentDir))
    {
        debug!("Rejected path {}", logical.display());
        return None;
    }

    if logical.exists() {
        debug!("Resolved exact path {}", logical.display());
        return Some(logical.to_path_buf());
    }

    let parent = logical.parent()?;
    let wanted = logical.file_name()?.to_string_lossy().to_lowercase();

    let found = fs::read_dir(parent)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().to_lowercase() == wanted)
        .map(|entry| entry.path())
        .min_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    match &found {
        Some(path) => debug!(
            "Resolved {} case-insensitively to {}",
            logical.display(),
            path.display()
        ),
        None => debug!(
            "Path not found: {} (parent exists: {})",
            logical.display(),
            parent.is_dir()
        ),
    }
    found
}

/// Comme [`resolve_path`], mais ne retient que les fichiers réguliers
pub fn resolve_file(logical: &Path) -> Option<PathBuf> {
    resolve_path(logical).filter(|path| path.is_file())
}
