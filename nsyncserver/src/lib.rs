//! # nsyncserver - Serveur HTTP de NSync
//!
//! Sert une bibliothèque de fichiers audio locaux et les playlists
//! générées par `nsyncplaylist`.
//!
//! ## Architecture
//!
//! - [`server`] : serveur Axum et son builder, arrêt gracieux sur Ctrl+C
//! - [`logs`] : initialisation de `tracing`
//! - [`routes`] : routes HTTP et état partagé
//! - [`resolve`] : résolution des chemins insensible à la casse
//! - [`stream`] : envoi de fichiers avec support `Range`
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use nsyncconfig::Config;
//! use nsyncserver::{AppState, ServerBuilder, router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let mut server = ServerBuilder::from_config("NSync", &config).build();
//!     server.add_router("/", router(AppState::from_config(&config)));
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod resolve;
pub mod routes;
pub mod server;
pub mod stream;

pub use routes::{AppState, ApiError, router};
pub use server::{Server, ServerBuilder};
