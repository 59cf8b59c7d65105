//! Envoi de fichiers avec support des requêtes `Range`
//!
//! Une seule plage est acceptée. Un en-tête mal formé est ignoré et le
//! fichier complet est renvoyé, jamais une erreur 400.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use nsyncutils::{content_type_for, http_date};
use std::io::{ErrorKind, SeekFrom};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Taille des blocs envoyés au client
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Interprétation d'un en-tête `Range` pour un fichier de taille donnée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// Pas de plage exploitable : fichier complet
    Full,
    /// Plage inclusive `start..=end`
    Partial { start: u64, end: u64 },
    /// Début de plage au-delà de la fin du fichier
    Unsatisfiable,
}

/// Analyse `bytes=<start>-<end>`
///
/// Un début omis vaut 0, une fin omise ou trop grande vaut `size - 1`.
///
/// ```
/// use nsyncserver::stream::{parse_range, RangeRequest};
///
/// assert_eq!(parse_range("bytes=10-", 100), RangeRequest::Partial { start: 10, end: 99 });
/// assert_eq!(parse_range("bytes=100-", 100), RangeRequest::Unsatisfiable);
/// assert_eq!(parse_range("items=0-1", 100), RangeRequest::Full);
/// ```
pub fn parse_range(header: &str, size: u64) -> RangeRequest {
    let header = header.trim();
    let Some(rest) = header
        .get(..6)
        .filter(|unit| unit.eq_ignore_ascii_case("bytes="))
        .map(|_| &header[6..])
    else {
        return RangeRequest::Full;
    };
    if rest.contains(',') {
        return RangeRequest::Full;
    }
    let Some((start, end)) = rest.split_once('-') else {
        return RangeRequest::Full;
    };

    let start = match start.trim() {
        "" => 0,
        s => match s.parse::<u64>() {
            Ok(v) => v,
            Err(_) => return RangeRequest::Full,
        },
    };
    let end = match end.trim() {
        "" => None,
        s => match s.parse::<u64>() {
            Ok(v) if v >= start => Some(v),
            _ => return RangeRequest::Full,
        },
    };

    if start >= size {
        return RangeRequest::Unsatisfiable;
    }
    let last = size - 1;
    RangeRequest::Partial {
        start,
        end: end.map_or(last, |end| end.min(last)),
    }
}

fn header_value(value: String) -> Option<HeaderValue> {
    HeaderValue::from_str(&value).ok()
}

/// Sert `path` en respectant l'en-tête `Range`
///
/// Pour une requête HEAD, les en-têtes sont identiques mais le fichier
/// n'est pas ouvert. Une déconnexion du client interrompt simplement
/// l'envoi.
pub async fn serve_file(path: &Path, method: &Method, range_header: Option<&str>) -> Response {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => return (StatusCode::NOT_FOUND, "File not found").into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
        Err(e) => {
            warn!("Cannot stat {}: {}", path.display(), e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };
    let size = meta.len();

    let range = range_header.map_or(RangeRequest::Full, |value| parse_range(value, size));
    debug!("Range {:?} on {} ({} bytes): {:?}", range_header, path.display(), size, range);

    let (status, start, length) = match range {
        RangeRequest::Unsatisfiable => {
            let mut headers = HeaderMap::new();
            if let Some(value) = header_value(format!("bytes */{size}")) {
                headers.insert(header::CONTENT_RANGE, value);
            }
            return (StatusCode::RANGE_NOT_SATISFIABLE, headers).into_response();
        }
        RangeRequest::Full => (StatusCode::OK, 0, size),
        RangeRequest::Partial { start, end } => (StatusCode::PARTIAL_CONTENT, start, end - start + 1),
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(
        header::CONTENT_TYPE,
        header_value(content_type_for(path))
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    if let Some(value) = meta.modified().ok().and_then(|t| header_value(http_date(t))) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    if status == StatusCode::PARTIAL_CONTENT {
        let end = start + length - 1;
        if let Some(value) = header_value(format!("bytes {start}-{end}/{size}")) {
            headers.insert(header::CONTENT_RANGE, value);
        }
    }

    if method == Method::HEAD {
        return (status, headers).into_response();
    }

    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Cannot open {}: {}", path.display(), e);
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
    };
    if start > 0 {
        if let Err(e) = file.seek(SeekFrom::Start(start)).await {
            warn!("Seek failed on {}: {}", path.display(), e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Seek failed").into_response();
        }
    }

    let stream = ReaderStream::with_capacity(file.take(length), CHUNK_SIZE);
    (status, headers, Body::from_stream(stream)).into_response()
}
