//! Extension pour construire le moteur de playlists depuis nsyncconfig

use crate::{PlaylistStore, PlaylistSync};
use nsyncconfig::Config;

/// Trait d'extension pour nsyncconfig::Config
///
/// # Exemple
///
/// ```rust,ignore
/// use nsyncconfig::Config;
/// use nsyncplaylist::PlaylistConfigExt;
///
/// let config = Config::load(None)?;
/// let updated = config.playlist_sync().sync_all(&config.sources);
/// ```
pub trait PlaylistConfigExt {
    /// Accès au répertoire `playlists.directory`
    fn playlist_store(&self) -> PlaylistStore;

    /// Moteur de synchronisation configuré (répertoire et couvertures)
    fn playlist_sync(&self) -> PlaylistSync;
}

impl PlaylistConfigExt for Config {
    fn playlist_store(&self) -> PlaylistStore {
        PlaylistStore::new(self.playlists.directory.clone())
    }

    fn playlist_sync(&self) -> PlaylistSync {
        PlaylistSync::new(self.playlist_store(), self.playlists.include_artwork)
    }
}
