//! # Module Server - Serveur HTTP au-dessus d'Axum
//!
//! Encapsule le routeur, l'écoute TCP et l'arrêt gracieux sur Ctrl+C.

use anyhow::{Context, Result};
use axum::Router;
use nsyncconfig::Config;
use std::net::SocketAddr;
use tokio::{signal, task::JoinHandle};
use tracing::{error, info};

/// Serveur principal
pub struct Server {
    name: String,
    bind_address: String,
    http_port: u16,
    router: Router,
    join_handle: Option<JoinHandle<()>>,
}

impl Server {
    /// Crée une nouvelle instance de serveur
    ///
    /// # Arguments
    ///
    /// * `name` - Nom du serveur (pour les logs)
    /// * `bind_address` - Adresse d'écoute (ex: "0.0.0.0")
    /// * `http_port` - Port HTTP, 0 pour un port choisi par le système
    pub fn new(name: impl Into<String>, bind_address: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            bind_address: bind_address.into(),
            http_port,
            router: Router::new(),
            join_handle: None,
        }
    }

    /// Ajoute un sous-router au serveur
    ///
    /// - Si `path` est "/", merge directement au router principal
    /// - Sinon, nest le router sous le chemin donné
    pub fn add_router(&mut self, path: &str, sub_router: Router) {
        let router = std::mem::take(&mut self.router);
        self.router = if path == "/" {
            router.merge(sub_router)
        } else {
            let normalized = format!("/{}", path.trim_start_matches('/'));
            router.nest(&normalized, sub_router)
        };
    }

    /// Démarre le serveur HTTP
    ///
    /// Lie le port puis sert les requêtes dans une tâche de fond jusqu'à
    /// Ctrl+C. Retourne l'adresse effectivement écoutée.
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// # use nsyncserver::Server;
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// let mut server = Server::new("NSync", "127.0.0.1", 8090);
    /// server.start().await?;
    /// server.wait().await;  // Attend Ctrl+C
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let listener = tokio::net::TcpListener::bind((self.bind_address.as_str(), self.http_port))
            .await
            .with_context(|| {
                format!("Cannot bind {}:{}", self.bind_address, self.http_port)
            })?;
        let addr = listener.local_addr()?;
        info!("Server {} running at http://{}", self.name, addr);

        let router = std::mem::take(&mut self.router);
        self.join_handle = Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await
            {
                error!("HTTP server error: {}", e);
            }
        }));
        Ok(addr)
    }

    /// Attend la fin du serveur
    pub async fn wait(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.await;
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received, shutting down"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Builder pattern
pub struct ServerBuilder {
    name: String,
    bind_address: String,
    http_port: u16,
}

impl ServerBuilder {
    /// Crée un nouveau builder
    ///
    /// # Arguments
    ///
    /// * `name` - Nom du serveur
    /// * `bind_address` - Adresse d'écoute
    /// * `http_port` - Port HTTP
    pub fn new(name: impl Into<String>, bind_address: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            bind_address: bind_address.into(),
            http_port,
        }
    }

    /// Builder initialisé depuis la section `host` de la configuration
    pub fn from_config(name: impl Into<String>, config: &Config) -> Self {
        Self::new(name, config.host.bind_address.clone(), config.host.http_port)
    }

    pub fn http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    /// Construit le serveur
    ///
    /// ```rust
    /// # use nsyncserver::ServerBuilder;
    /// let server = ServerBuilder::new("NSync", "0.0.0.0", 8090)
    ///     .http_port(9000)
    ///     .build();
    /// assert_eq!(server.name(), "NSync");
    /// ```
    pub fn build(self) -> Server {
        Server::new(self.name, self.bind_address, self.http_port)
    }
}
