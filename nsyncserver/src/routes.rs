//! Routes HTTP de NSync
//!
//! | Méthode | Chemin | Réponse |
//! |---|---|---|
//! | GET | `/status` | `OK` |
//! | GET | `/list` | noms des playlists (JSON) |
//! | GET | `/hash/{name}` | MD5 hexadécimal de la playlist |
//! | GET | `/playlist/{name}` | contenu de la playlist |
//! | GET | `/artwork/{chemin audio}` | couverture du répertoire |
//! | GET/HEAD | `/stream/{chemin}` | fichier, avec support `Range` |
//! | POST | `/sync/{name}` | synchronisation immédiate (JSON) |
//!
//! `/hash` et `/playlist` sans nom désignent `master_playlist`.

use crate::resolve::resolve_file;
use crate::stream::serve_file;
use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use md5::{Digest, Md5};
use nsyncconfig::{Config, Source};
use nsynccovers::{Artwork, ArtworkCache, ArtworkCacheConfigExt, CoversError};
use nsyncplaylist::codec::decode_path;
use nsyncplaylist::{PlaylistConfigExt, PlaylistError, PlaylistSync, SyncReport};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Playlist servie par les routes historiques `/hash` et `/playlist`
pub const LEGACY_PLAYLIST: &str = "master_playlist";

/// Nombre maximal de fichiers listés dans la réponse de `/sync`
pub const MAX_LISTED_FILES: usize = 20;

const ARTWORK_CACHE_CONTROL: &str = "public, max-age=86400";
const PLAYLIST_CONTENT_TYPE: &str = "application/x-mpegurl";

/// État partagé entre les handlers
#[derive(Clone)]
pub struct AppState {
    pub sources: Arc<Vec<Source>>,
    pub covers: Arc<ArtworkCache>,
    pub sync: Arc<PlaylistSync>,
}

impl AppState {
    pub fn new(sources: Vec<Source>, covers: ArtworkCache, sync: PlaylistSync) -> Self {
        Self {
            sources: Arc::new(sources),
            covers: Arc::new(covers),
            sync: Arc::new(sync),
        }
    }

    /// État construit depuis la configuration chargée
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.sources.clone(),
            config.create_artwork_cache(),
            config.playlist_sync(),
        )
    }
}

/// Erreur convertie en réponse texte
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(e) => {
                error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.status_and_message().into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

/// Même erreur, rendue sous la forme `{"error": "..."}`
#[derive(Debug)]
pub struct JsonApiError(ApiError);

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.status_and_message();
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<ApiError> for JsonApiError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

/// Corps de la réponse de `POST /sync/{name}`
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub playlist: String,
    pub updated: bool,
    pub added_count: usize,
    pub removed_count: usize,
    pub total: usize,
    pub added_files: Vec<String>,
    pub removed_files: Vec<String>,
}

fn listed(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .take(MAX_LISTED_FILES)
        .map(|path| path.to_string_lossy().into_owned())
        .collect()
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            updated: report.updated(),
            added_count: report.added.len(),
            removed_count: report.removed.len(),
            total: report.total,
            added_files: listed(&report.added),
            removed_files: listed(&report.removed),
            playlist: report.playlist,
        }
    }
}

/// Construit le routeur complet
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/list", get(list_playlists))
        .route("/hash", get(legacy_hash))
        .route("/hash/{name}", get(playlist_hash))
        .route("/playlist", get(legacy_playlist))
        .route("/playlist/{name}", get(download_playlist))
        .route("/artwork/{*path}", get(artwork))
        .route("/stream/{*path}", get(stream))
        .route("/sync/{name}", post(sync_playlist))
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    info!(method = %request.method(), path = %request.uri().path(), "Incoming request");
    if let Some(range) = request.headers().get(header::RANGE) {
        debug!(range = ?range, "Range header");
    }
    next.run(request).await
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

async fn status() -> &'static str {
    "OK"
}

/// Chemin absolu décodé à partir de l'URI, sans le préfixe de route
fn logical_path(uri_path: &str, prefix: &str) -> Option<PathBuf> {
    let encoded = uri_path.strip_prefix(prefix)?;
    if !encoded.starts_with('/') {
        return None;
    }
    Some(decode_path(encoded))
}

/// Vrai si la query contient `artwork`, `cover` ou `art`
fn wants_artwork(query: Option<&str>) -> bool {
    query.is_some_and(|query| {
        query
            .split('&')
            .map(|pair| pair.split_once('=').map_or(pair, |(key, _)| key))
            .any(|key| matches!(key, "artwork" | "cover" | "art"))
    })
}

async fn read_playlist(state: &AppState, name: String) -> Result<Option<Vec<u8>>, ApiError> {
    let sync = state.sync.clone();
    match tokio::task::spawn_blocking(move || sync.store().read(&name)).await? {
        Ok(content) => Ok(content),
        Err(PlaylistError::InvalidName(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_playlists(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let sync = state.sync.clone();
    let names = tokio::task::spawn_blocking(move || sync.store().list()).await??;
    Ok(Json(names))
}

async fn hash_response(state: &AppState, name: String) -> Result<String, ApiError> {
    let missing = ApiError::NotFound(format!("Playlist '{name}' not found"));
    let content = read_playlist(state, name).await?.ok_or(missing)?;
    Ok(hex::encode(Md5::digest(&content)))
}

async fn playlist_hash(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<String, ApiError> {
    hash_response(&state, name).await
}

async fn legacy_hash(State(state): State<AppState>) -> Result<String, ApiError> {
    hash_response(&state, LEGACY_PLAYLIST.to_string()).await
}

async fn playlist_response(
    state: &AppState,
    name: String,
    filename: String,
) -> Result<Response, ApiError> {
    let missing = ApiError::NotFound(format!("Playlist '{name}' not found"));
    let content = read_playlist(state, name).await?.ok_or(missing)?;
    Ok((
        [
            (header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        content,
    )
        .into_response())
}

async fn download_playlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let filename = format!("{name}.m3u8");
    playlist_response(&state, name, filename).await
}

async fn legacy_playlist(State(state): State<AppState>) -> Result<Response, ApiError> {
    playlist_response(&state, LEGACY_PLAYLIST.to_string(), "playlist.m3u8".to_string()).await
}

/// Couverture du répertoire contenant le fichier audio `logical`
///
/// `None` si le fichier audio ou la couverture n'existe pas.
async fn lookup_artwork(
    state: &AppState,
    logical: PathBuf,
) -> Result<Option<Arc<Artwork>>, ApiError> {
    let covers = state.covers.clone();
    let artwork = tokio::task::spawn_blocking(move || match resolve_file(&logical) {
        Some(file) => covers.lookup_for_file(&file),
        None => {
            debug!("Audio file not found for artwork: {}", logical.display());
            Ok::<_, CoversError>(None)
        }
    })
    .await??;
    Ok(artwork)
}

fn artwork_response(artwork: &Artwork) -> Response {
    (
        [
            (header::CONTENT_TYPE, artwork.mime.clone()),
            (header::CACHE_CONTROL, ARTWORK_CACHE_CONTROL.to_string()),
        ],
        Body::from(artwork.data.clone()),
    )
        .into_response()
}

async fn artwork(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    let missing = || ApiError::NotFound("Artwork not found".to_string());
    let logical = logical_path(uri.path(), "/artwork").ok_or_else(missing)?;
    let artwork = lookup_artwork(&state, logical).await?.ok_or_else(missing)?;
    debug!("Serving artwork {}", artwork.path.display());
    Ok(artwork_response(&artwork))
}

async fn stream(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let missing = || ApiError::NotFound("File not found".to_string());
    let logical = logical_path(uri.path(), "/stream").ok_or_else(missing)?;

    if wants_artwork(uri.query()) {
        if let Some(artwork) = lookup_artwork(&state, logical.clone()).await? {
            debug!("Artwork query, serving {}", artwork.path.display());
            return Ok(artwork_response(&artwork));
        }
        debug!("Artwork query without artwork, streaming {}", logical.display());
    }

    let path = tokio::task::spawn_blocking(move || resolve_file(&logical))
        .await?
        .ok_or_else(missing)?;
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    Ok(serve_file(&path, &method, range).await)
}

async fn sync_playlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SyncResponse>, JsonApiError> {
    let sync = state.sync.clone();
    let sources = state.sources.clone();
    let result = tokio::task::spawn_blocking(move || sync.sync_by_name(&sources, &name))
        .await
        .map_err(ApiError::from)?;

    let report = result.map_err(|e| match e {
        PlaylistError::SourceNotFound(name) => {
            ApiError::NotFound(format!("No source configured for playlist '{name}'"))
        }
        e => ApiError::from(e),
    })?;
    Ok(Json(SyncResponse::from(report)))
}
