//! Synchronisation des playlists, au démarrage et en boucle

use nsyncconfig::Source;
use nsyncplaylist::PlaylistSync;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

/// Synchronise toutes les sources dans un thread bloquant
///
/// Retourne le nombre de playlists réécrites.
pub async fn sync_once(sync: Arc<PlaylistSync>, sources: Arc<Vec<Source>>) -> usize {
    match tokio::task::spawn_blocking(move || sync.sync_all(&sources)).await {
        Ok(updated) => updated,
        Err(e) => {
            error!("Playlist sync task failed: {}", e);
            0
        }
    }
}

/// Resynchronise toutes les `period`, sans jamais s'arrêter sur une erreur
///
/// La première synchronisation a lieu une période après l'appel.
pub async fn watch(sync: Arc<PlaylistSync>, sources: Arc<Vec<Source>>, period: Duration) {
    info!("Watching sources every {}s", period.as_secs());
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let updated = sync_once(sync.clone(), sources.clone()).await;
        if updated > 0 {
            info!("Watch cycle: {} playlist(s) updated", updated);
        }
    }
}
