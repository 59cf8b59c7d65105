//! Répertoire de sortie des playlists `<nom>.m3u8`

use crate::error::{PlaylistError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const PLAYLIST_EXTENSION: &str = "m3u8";

/// Accès aux fichiers de playlist d'un répertoire
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    dir: PathBuf,
}

impl PlaylistStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Un nom valide est non vide, sans séparateur, et différent de `.`/`..`
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0'])
    }

    /// Chemin du fichier de la playlist `name`
    pub fn path(&self, name: &str) -> Result<PathBuf> {
        if !Self::is_valid_name(name) {
            return Err(PlaylistError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.{PLAYLIST_EXTENSION}")))
    }

    /// Noms des playlists présentes, triés, sans l'extension
    ///
    /// Un répertoire absent donne une liste vide.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PlaylistError::Read {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext == PLAYLIST_EXTENSION)
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Contenu brut de la playlist, `None` si elle n'existe pas
    pub fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PlaylistError::Read { path, source }),
        }
    }

    /// Écrit la playlist via un fichier temporaire renommé
    ///
    /// Un lecteur concurrent voit l'ancien contenu ou le nouveau, jamais un
    /// fichier partiel.
    pub fn write_atomic(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(name)?;
        let write_err = |source: io::Error| PlaylistError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        debug!("Wrote playlist {} ({} bytes)", path.display(), content.len());
        Ok(path)
    }
}
