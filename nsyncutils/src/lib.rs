/// Utilitaires partagés par les crates NSync.
///
/// # Fonctions principales
///
/// - [`content_type_for`] : type MIME d'un fichier d'après son extension
/// - [`http_date`] : date au format HTTP (`Last-Modified`)
///
/// # Examples
///
/// ```
/// use nsyncutils::content_type_for;
///
/// assert_eq!(content_type_for("/music/track.flac"), "audio/flac");
/// ```
mod mime;

pub use mime::{content_type_for, image_type_for, is_image_file};

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Formate un instant au format IMF-fixdate utilisé par les en-têtes HTTP.
///
/// # Exemples
///
/// ```
/// use nsyncutils::http_date;
/// use std::time::{Duration, UNIX_EPOCH};
///
/// let date = http_date(UNIX_EPOCH + Duration::from_secs(784111777));
/// assert_eq!(date, "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn http_date(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
