//! # nsyncplaylist - Playlists M3U8 synchronisées avec le disque
//!
//! Chaque source configurée (un répertoire de musique) est associée à une
//! playlist `<nom>.m3u8` dans le répertoire de sortie. La synchronisation
//! ne réécrit le fichier que si le contenu du répertoire a changé, et se
//! contente d'ajouter en fin de fichier quand aucun morceau n'a disparu.
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use nsyncconfig::Source;
//! use nsyncplaylist::{PlaylistStore, PlaylistSync};
//!
//! let sync = PlaylistSync::new(PlaylistStore::new("/data"), true);
//! let source = Source {
//!     name: "music".into(),
//!     path: "/mnt/Music".into(),
//!     recursive: true,
//!     recently_added_days: None,
//! };
//! let report = sync.sync(&source)?;
//! println!("{}: {} entrées", report.playlist, report.total);
//! # Ok::<(), nsyncplaylist::PlaylistError>(())
//! ```

pub mod codec;
pub mod config_ext;
mod error;
pub mod scanner;
pub mod store;
pub mod sync;

pub use config_ext::PlaylistConfigExt;
pub use error::{PlaylistError, Result};
pub use scanner::{AUDIO_EXTENSIONS, is_audio_file, scan};
pub use store::PlaylistStore;
pub use sync::{PlaylistSync, SyncAction, SyncReport};
