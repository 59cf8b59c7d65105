//! Synchronisation incrémentale des playlists
//!
//! Pour chaque source, le moteur compare la playlist existante au contenu
//! actuel du répertoire :
//!
//! - rien n'a changé : aucune écriture ;
//! - au moins un fichier a disparu : la playlist est régénérée ;
//! - seulement des ajouts : les nouvelles entrées sont ajoutées en fin de
//!   fichier, le reste du texte est conservé tel quel.

use crate::codec::{self, HEADER};
use crate::error::{PlaylistError, Result};
use crate::scanner::{path_order, scan};
use crate::store::PlaylistStore;
use nsyncconfig::Source;
use nsynccovers::find_artwork;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Décision prise par une synchronisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Unchanged,
    Appended,
    Regenerated,
}

/// Résultat d'une synchronisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Nom de la playlist (nom de la source)
    pub playlist: String,
    pub action: SyncAction,
    /// Fichiers ajoutés, dans l'ordre du scan
    pub added: Vec<PathBuf>,
    /// Fichiers retirés, triés par chemin
    pub removed: Vec<PathBuf>,
    /// Nombre d'entrées après synchronisation
    pub total: usize,
}

impl SyncReport {
    /// Vrai si le fichier a été réécrit
    pub fn updated(&self) -> bool {
        self.action != SyncAction::Unchanged
    }
}

/// Moteur de synchronisation, partageable entre threads
pub struct PlaylistSync {
    store: PlaylistStore,
    include_artwork: bool,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PlaylistSync {
    /// # Arguments
    ///
    /// * `store` - Répertoire de sortie des playlists
    /// * `include_artwork` - Émet les lignes `#EXTIMG`
    pub fn new(store: PlaylistStore, include_artwork: bool) -> Self {
        Self {
            store,
            include_artwork,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    pub fn include_artwork(&self) -> bool {
        self.include_artwork
    }

    /// Verrou propre à un nom de playlist
    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(name.to_string()).or_default().clone()
    }

    /// Synchronise la playlist d'une source
    ///
    /// Deux appels concurrents pour le même nom sont exécutés l'un après
    /// l'autre ; des noms différents avancent en parallèle.
    pub fn sync(&self, source: &Source) -> Result<SyncReport> {
        let name = source.name.as_str();
        let lock = self.lock_for(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let existing = self
            .store
            .read(name)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
        let known: HashSet<PathBuf> = existing
            .as_deref()
            .map(codec::decode)
            .unwrap_or_default()
            .into_iter()
            .collect();

        debug!("Scanning {} for {}", source.path.display(), name);
        let current = scan(&source.path, source.recursive, source.recently_added_days);
        if current.is_empty() {
            warn!("No audio files found in {}", source.path.display());
        }
        let current_set: HashSet<&PathBuf> = current.iter().collect();

        let added: Vec<PathBuf> = current
            .iter()
            .filter(|path| !known.contains(*path))
            .cloned()
            .collect();
        let mut removed: Vec<PathBuf> = known
            .iter()
            .filter(|path| !current_set.contains(path))
            .cloned()
            .collect();
        removed.sort_by(|a, b| path_order(a, b));

        let action = if !removed.is_empty() {
            let content = codec::encode(&current, self.include_artwork);
            self.store.write_atomic(name, &content)?;
            info!(
                "Regenerated playlist '{}' with {} files ({} added, {} removed)",
                name,
                current.len(),
                added.len(),
                removed.len()
            );
            SyncAction::Regenerated
        } else if !added.is_empty() {
            let content = self.appended(existing.as_deref(), &added);
            self.store.write_atomic(name, &content)?;
            info!(
                "Appended {} files to playlist '{}' ({} total)",
                added.len(),
                name,
                current.len()
            );
            SyncAction::Appended
        } else {
            debug!("Playlist '{}' unchanged ({} files)", name, current.len());
            SyncAction::Unchanged
        };

        Ok(SyncReport {
            playlist: name.to_string(),
            action,
            added,
            removed,
            total: current.len(),
        })
    }

    /// Texte existant suivi des lignes des nouvelles entrées
    fn appended(&self, existing: Option<&str>, added: &[PathBuf]) -> String {
        let mut content = match existing {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("{HEADER}\n"),
        };
        if !content.ends_with('\n') {
            content.push('\n');
        }

        let lines = if self.include_artwork {
            codec::encode_entries(added, find_artwork)
        } else {
            codec::encode_entries(added, |_| None)
        };
        content.push_str(&lines);
        content
    }

    /// Synchronise la source nommée `name`
    pub fn sync_by_name(&self, sources: &[Source], name: &str) -> Result<SyncReport> {
        let source = sources
            .iter()
            .find(|source| source.name == name)
            .ok_or_else(|| PlaylistError::SourceNotFound(name.to_string()))?;
        self.sync(source)
    }

    /// Synchronise toutes les sources et retourne le nombre de playlists réécrites
    ///
    /// L'échec d'une source est journalisé et n'interrompt pas les suivantes.
    pub fn sync_all(&self, sources: &[Source]) -> usize {
        if sources.is_empty() {
            warn!("No sources configured, nothing to synchronize");
            return 0;
        }

        let mut updated = 0;
        for source in sources {
            match self.sync(source) {
                Ok(report) if report.updated() => updated += 1,
                Ok(_) => {}
                Err(e) => error!("Failed to sync playlist '{}': {}", source.name, e),
            }
        }

        info!(
            "Playlist sync complete: {} of {} playlists updated",
            updated,
            sources.len()
        );
        updated
    }
}
