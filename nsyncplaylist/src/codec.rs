//! Lecture et écriture du format M3U8
//!
//! Format produit :
//!
//! ```text
//! #EXTM3U
//! #EXTIMG:/stream/music/Album/cover.jpg
//! #EXTINF:-1,track1
//! /stream/music/Album/track1.flac
//! ```
//!
//! Les URLs sont le chemin absolu encodé, préfixé par `/stream`. Seules les
//! lignes commençant par `/stream/` sont relues, les commentaires et les
//! lignes étrangères sont ignorés.

use nsynccovers::find_artwork;
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::ffi::OsString;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

pub const HEADER: &str = "#EXTM3U";
pub const STREAM_PREFIX: &str = "/stream";

/// Caractères laissés tels quels : alphanumériques, `_ . - ~` et `/`
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Construit l'URL de streaming d'un chemin absolu
///
/// # Exemple
///
/// ```
/// use nsyncplaylist::codec::stream_url;
/// use std::path::Path;
///
/// assert_eq!(
///     stream_url(Path::new("/music/My Album/01 - intro.flac")),
///     "/stream/music/My%20Album/01%20-%20intro.flac"
/// );
/// ```
///
/// Les octets du chemin sont encodés tels quels, un nom qui n'est pas de
/// l'UTF-8 valide est donc conservé.
pub fn stream_url(path: &Path) -> String {
    format!(
        "{}{}",
        STREAM_PREFIX,
        percent_encode(path.as_os_str().as_bytes(), PATH_ENCODE_SET)
    )
}

/// Décode un chemin encodé par [`stream_url`], octet par octet
pub fn decode_path(encoded: &str) -> PathBuf {
    let bytes: Vec<u8> = percent_decode_str(encoded).collect();
    PathBuf::from(OsString::from_vec(bytes))
}

/// Inverse de [`stream_url`], `None` si la ligne n'est pas une URL de streaming
pub fn path_from_stream_url(line: &str) -> Option<PathBuf> {
    let encoded = line.strip_prefix(STREAM_PREFIX)?;
    if !encoded.starts_with('/') {
        return None;
    }
    Some(decode_path(encoded))
}

/// Titre affiché : nom du fichier sans extension, sur une seule ligne
fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['\r', '\n'], " "))
        .unwrap_or_default()
}

/// Encode une playlist complète, en-tête compris
///
/// Quand `include_artwork` est vrai, la couverture du répertoire est
/// cherchée sur le disque à chaque changement de répertoire.
pub fn encode(entries: &[PathBuf], include_artwork: bool) -> String {
    if include_artwork {
        encode_with(entries, find_artwork)
    } else {
        encode_with(entries, |_| None)
    }
}

/// Comme [`encode`], avec une fonction de recherche de couverture fournie
pub fn encode_with<F>(entries: &[PathBuf], artwork_for: F) -> String
where
    F: FnMut(&Path) -> Option<PathBuf>,
{
    let mut out = String::with_capacity(HEADER.len() + 1 + entries.len() * 96);
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(&encode_entries(entries, artwork_for));
    out
}

/// Encode les lignes des entrées, sans en-tête
///
/// La règle de couverture ne dépend que de la séquence fournie : la
/// première entrée ouvre toujours un nouveau répertoire.
pub fn encode_entries<F>(entries: &[PathBuf], mut artwork_for: F) -> String
where
    F: FnMut(&Path) -> Option<PathBuf>,
{
    let mut out = String::new();
    let mut current_dir: Option<&Path> = None;

    for entry in entries {
        let dir = entry.parent();
        if dir != current_dir {
            current_dir = dir;
            if let Some(artwork) = dir.and_then(|d| artwork_for(d)) {
                out.push_str("#EXTIMG:");
                out.push_str(&stream_url(&artwork));
                out.push('\n');
            }
        }

        out.push_str("#EXTINF:-1,");
        out.push_str(&title_for(entry));
        out.push('\n');
        out.push_str(&stream_url(entry));
        out.push('\n');
    }

    out
}

/// Relit les chemins d'une playlist, dans l'ordre du fichier
pub fn decode(text: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("/stream/"))
        .filter_map(path_from_stream_url)
        .collect()
}
