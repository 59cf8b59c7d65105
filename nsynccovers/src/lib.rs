//! # nsynccovers - Couvertures d'albums pour NSync
//!
//! Cette crate localise l'image de couverture d'un répertoire d'album et la
//! garde en mémoire pour les requêtes suivantes.
//!
//! ## Fonctionnalités
//!
//! - Recherche par noms conventionnels (`cover.jpg`, `folder.png`, ...)
//! - Repli sur n'importe quelle image jpg/jpeg/png du répertoire
//! - Cache borné, partagé entre threads, avec résultats négatifs mémorisés
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use nsynccovers::ArtworkCache;
//! use std::path::Path;
//!
//! let cache = ArtworkCache::new(500);
//! if let Some(artwork) = cache.lookup(Path::new("/music/Album"))? {
//!     println!("{} ({} octets)", artwork.mime, artwork.data.len());
//! }
//! # Ok::<(), nsynccovers::CoversError>(())
//! ```

pub mod cache;
mod error;
pub mod locator;

#[cfg(feature = "nsyncconfig")]
pub mod config_ext;

pub use cache::{Artwork, ArtworkCache, CacheStats, DEFAULT_CAPACITY};
pub use error::{CoversError, Result};
pub use locator::{ARTWORK_FILENAMES, find_artwork};

#[cfg(feature = "nsyncconfig")]
pub use config_ext::ArtworkCacheConfigExt;
