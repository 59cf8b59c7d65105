//! Recherche de l'image de couverture d'un répertoire
//!
//! Les noms conventionnels sont essayés dans l'ordre ; à défaut, la première
//! image jpg/jpeg/png trouvée (par ordre de nom) est retenue.

use nsyncutils::is_image_file;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Noms de couverture par ordre de priorité
#[rustfmt::skip]
pub const ARTWORK_FILENAMES: [&str; 30] = [
    "cover.jpg", "Cover.jpg", "COVER.JPG",
    "folder.jpg", "Folder.jpg", "FOLDER.JPG",
    "front.jpg", "Front.jpg", "FRONT.JPG",
    "cover.png", "Cover.png", "COVER.PNG",
    "folder.png", "Folder.png", "FOLDER.PNG",
    "front.png", "Front.png", "FRONT.PNG",
    "album.jpg", "Album.jpg", "ALBUM.JPG",
    "albumart.jpg", "AlbumArt.jpg", "ALBUMART.JPG",
    "album.png", "Album.png", "ALBUM.PNG",
    "albumart.png", "AlbumArt.png", "ALBUMART.PNG",
];

/// Cherche une image de couverture dans `directory`
///
/// Retourne `None` si le répertoire n'existe pas ou ne contient aucune image.
pub fn find_artwork(directory: &Path) -> Option<PathBuf> {
    for name in ARTWORK_FILENAMES {
        let candidate = directory.join(name);
        if candidate.is_file() {
            trace!("Artwork found by name: {}", candidate.display());
            return Some(candidate);
        }
    }

    let entries = fs::read_dir(directory).ok()?;
    let fallback = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_image_file(path) && path.is_file())
        .min();

    if let Some(path) = &fallback {
        trace!("Artwork found by extension: {}", path.display());
    }
    fallback
}
