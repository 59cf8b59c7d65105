//! Cache mémoire des couvertures par répertoire
//!
//! Chaque répertoire consulté est associé soit à l'image trouvée (octets et
//! type MIME), soit à un marqueur négatif qui évite de rescanner un album
//! sans illustration.
//!
//! Un seul `Mutex` protège toute la structure. Sur un miss, la recherche et la
//! lecture du fichier se font hors verrou, puis le résultat est inséré sous le
//! verrou (le dernier écrivain gagne, la valeur ne dépend que du chemin).

use crate::error::{CoversError, Result};
use crate::locator::find_artwork;
use bytes::Bytes;
use nsyncutils::image_type_for;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Capacité par défaut (nombre de répertoires)
pub const DEFAULT_CAPACITY: usize = 500;

/// Image de couverture chargée en mémoire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    /// Fichier d'origine
    pub path: PathBuf,
    /// Type MIME résolu depuis l'extension
    pub mime: String,
    pub data: Bytes,
}

/// Compteurs d'utilisation du cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

struct CacheEntry {
    /// `None` : aucune image dans le répertoire
    value: Option<Arc<Artwork>>,
    inserted_at: Instant,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<PathBuf, CacheEntry>,
    stats: CacheStats,
}

/// Cache borné répertoire → couverture
///
/// Conçu pour être partagé derrière un `Arc<ArtworkCache>` entre tous les
/// handlers HTTP.
pub struct ArtworkCache {
    capacity: usize,
    ttl: Option<Duration>,
    inner: Mutex<CacheInner>,
}

impl Default for ArtworkCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ArtworkCache {
    /// Crée un cache sans expiration
    ///
    /// # Arguments
    ///
    /// * `capacity` - Nombre maximal de répertoires conservés (au moins 1)
    pub fn new(capacity: usize) -> Self {
        Self::with_ttl(capacity, None)
    }

    /// Crée un cache dont les entrées expirent après `ttl`
    ///
    /// L'âge d'une entrée est vérifié à la lecture, sans accès disque.
    pub fn with_ttl(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retourne la couverture du répertoire, ou `None` s'il n'en a pas
    ///
    /// Un hit ne touche pas au disque. Un miss lance la recherche, lit
    /// l'image trouvée et mémorise le résultat, y compris négatif.
    /// Une erreur de lecture n'est pas mise en cache.
    pub fn lookup(&self, directory: &Path) -> Result<Option<Arc<Artwork>>> {
        if let Some(cached) = self.get_cached(directory) {
            return Ok(cached);
        }

        let value = match find_artwork(directory) {
            Some(path) => {
                let data = std::fs::read(&path).map_err(|source| CoversError::Read {
                    path: path.clone(),
                    source,
                })?;
                Some(Arc::new(Artwork {
                    mime: image_type_for(&path),
                    data: Bytes::from(data),
                    path,
                }))
            }
            None => None,
        };

        debug!(
            directory = %directory.display(),
            found = value.is_some(),
            "Artwork cache miss"
        );
        self.insert(directory.to_path_buf(), value.clone());
        Ok(value)
    }

    /// Retourne la couverture du répertoire contenant `file`
    pub fn lookup_for_file(&self, file: &Path) -> Result<Option<Arc<Artwork>>> {
        match file.parent() {
            Some(directory) => self.lookup(directory),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            entries: inner.entries.len(),
            ..inner.stats
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `Some(valeur)` sur un hit valide, `None` sur un miss
    fn get_cached(&self, directory: &Path) -> Option<Option<Arc<Artwork>>> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let expired = match inner.entries.get(directory) {
            Some(entry) => self
                .ttl
                .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl),
            None => {
                inner.stats.misses += 1;
                return None;
            }
        };

        if expired {
            inner.entries.remove(directory);
            inner.stats.misses += 1;
            return None;
        }

        inner.stats.hits += 1;
        inner.entries.get(directory).map(|entry| entry.value.clone())
    }

    fn insert(&self, directory: PathBuf, value: Option<Arc<Artwork>>) {
        let mut guard = self.lock();
        let inner = &mut *guard;

        if !inner.entries.contains_key(&directory) && inner.entries.len() >= self.capacity {
            Self::evict_oldest_half(inner);
        }

        inner.entries.insert(
            directory,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn evict_oldest_half(inner: &mut CacheInner) {
        let count = inner.entries.len();
        let to_remove = (count / 2).max(1);

        let mut by_age: Vec<(Instant, PathBuf)> = inner
            .entries
            .iter()
            .map(|(dir, entry)| (entry.inserted_at, dir.clone()))
            .collect();
        by_age.sort_by_key(|(inserted_at, _)| *inserted_at);

        for (_, dir) in by_age.into_iter().take(to_remove) {
            inner.entries.remove(&dir);
        }
        inner.stats.evictions += to_remove as u64;

        debug!(
            "Artwork cache eviction: removed {} entries (cache size: {} -> {})",
            to_remove,
            count,
            count - to_remove
        );
    }
}
