//! Résolution des types MIME
//!
//! Les formats audio et image servis le plus souvent sont enregistrés
//! explicitement, `mime_guess` couvre le reste.

use std::path::Path;

const EXPLICIT_TYPES: [(&str, &str); 15] = [
    ("flac", "audio/flac"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("alac", "audio/mp4"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/ogg"),
    ("wav", "audio/wav"),
    ("aac", "audio/aac"),
    ("ape", "audio/x-ape"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
];

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Type MIME d'un fichier, `application/octet-stream` si inconnu
pub fn content_type_for(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    if let Some(ext) = extension_of(path) {
        if let Some((_, mime)) = EXPLICIT_TYPES.iter().find(|(e, _)| *e == ext) {
            return (*mime).to_string();
        }
    }
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Type MIME d'une image de couverture, `image/jpeg` par défaut
pub fn image_type_for(path: impl AsRef<Path>) -> String {
    let mime = content_type_for(path);
    if mime.starts_with("image/") {
        mime
    } else {
        "image/jpeg".to_string()
    }
}

/// Vrai si l'extension (insensible à la casse) est jpg, jpeg ou png
pub fn is_image_file(path: impl AsRef<Path>) -> bool {
    extension_of(path.as_ref()).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_types() {
        assert_eq!(content_type_for("a.FLAC"), "audio/flac");
        assert_eq!(content_type_for("a.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("a.m4a"), "audio/mp4");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type_for("a.nsync-unknown"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_image_fallback() {
        assert_eq!(image_type_for("Cover.PNG"), "image/png");
        assert_eq!(image_type_for("art.nsync-unknown"), "image/jpeg");
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("Cover.JPG"));
        assert!(is_image_file("x.jpeg"));
        assert!(!is_image_file("x.gif"));
        assert!(!is_image_file("jpg"));
    }
}
