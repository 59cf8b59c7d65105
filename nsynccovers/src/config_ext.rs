//! Extension pour créer le cache de couvertures depuis nsyncconfig

use crate::ArtworkCache;
use nsyncconfig::Config;

/// Trait d'extension pour nsyncconfig::Config
///
/// # Exemple
///
/// ```rust,ignore
/// use nsyncconfig::Config;
/// use nsynccovers::ArtworkCacheConfigExt;
///
/// let config = Config::load(None)?;
/// let cache = config.create_artwork_cache();
/// ```
pub trait ArtworkCacheConfigExt {
    /// Crée un cache dimensionné selon la section `covers`
    fn create_artwork_cache(&self) -> ArtworkCache;
}

impl ArtworkCacheConfigExt for Config {
    fn create_artwork_cache(&self) -> ArtworkCache {
        ArtworkCache::with_ttl(self.covers.capacity, self.covers.ttl())
    }
}
