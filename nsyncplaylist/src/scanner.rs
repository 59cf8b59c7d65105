//! Parcours d'un répertoire source à la recherche de fichiers audio

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions audio reconnues (comparées sans tenir compte de la casse)
pub const AUDIO_EXTENSIONS: [&str; 10] = [
    "flac", "mp3", "m4a", "ogg", "opus", "wav", "aac", "wma", "ape", "alac",
];

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Vrai si l'extension du chemin fait partie de [`AUDIO_EXTENSIONS`]
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Ordre lexicographique octet par octet des chemins
pub(crate) fn path_order(a: &Path, b: &Path) -> Ordering {
    a.as_os_str().cmp(b.as_os_str())
}

/// Liste les fichiers audio de `root`
///
/// # Arguments
///
/// * `root` - Répertoire à parcourir, un répertoire absent donne une liste vide
/// * `recursive` - Parcourt toute l'arborescence, sinon les enfants directs seulement
/// * `recently_added_days` - Ne garde que les fichiers modifiés depuis N jours
///
/// # Retourne
///
/// Les chemins triés par ordre lexicographique, ou du plus récent au plus
/// ancien quand le filtre de récence est actif. Les fichiers dont la date
/// ne peut être lue sont écartés.
pub fn scan(root: &Path, recursive: bool, recently_added_days: Option<u32>) -> Vec<PathBuf> {
    if !root.is_dir() {
        warn!("Directory does not exist: {}", root.display());
        return Vec::new();
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|path| is_audio_file(path) && path.is_file())
        .collect();

    match recently_added_days.filter(|days| *days > 0) {
        Some(days) => {
            let cutoff = SystemTime::now()
                .checked_sub(Duration::from_secs(u64::from(days) * SECONDS_PER_DAY))
                .unwrap_or(UNIX_EPOCH);

            let mut dated: Vec<(SystemTime, PathBuf)> = files
                .into_iter()
                .filter_map(|path| {
                    let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
                    (modified >= cutoff).then_some((modified, path))
                })
                .collect();

            dated.sort_by(|(ta, pa), (tb, pb)| tb.cmp(ta).then_with(|| path_order(pa, pb)));
            dated.into_iter().map(|(_, path)| path).collect()
        }
        None => {
            files.sort_by(|a, b| path_order(a, b));
            files
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_extensions() {
        assert!(is_audio_file(Path::new("/a/b.flac")));
        assert!(is_audio_file(Path::new("/a/B.FLAC")));
        assert!(is_audio_file(Path::new("/a/b.Opus")));
        assert!(!is_audio_file(Path::new("/a/cover.jpg")));
        assert!(!is_audio_file(Path::new("/a/flac")));
    }

    #[test]
    fn test_path_order_is_bytewise() {
        // ' ' (0x20) < '/' (0x2F) : "Album 2/..." passe avant "Album/..."
        assert_eq!(
            path_order(Path::new("/m/Album 2/a.mp3"), Path::new("/m/Album/a.mp3")),
            Ordering::Less
        );
    }
}
