mod cli;
mod watch;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, WatchArgs};
use nsyncconfig::Config;
use nsyncplaylist::PlaylistConfigExt;
use nsyncserver::logs::{LoggingOptions, init_logging};
use nsyncserver::{AppState, ServerBuilder, router};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs actifs pendant le chargement de la configuration
    let logging = init_logging(LoggingOptions::default().debug(cli.debug));

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.no_artwork {
        config.playlists.include_artwork = false;
    }
    logging.apply(&LoggingOptions::from_config(&config.host.logger).debug(cli.debug));

    info!("Playlist directory: {}", config.playlists.directory.display());
    if config.sources.is_empty() {
        warn!("No sources configured, playlists will not be generated");
    }

    match cli.command.unwrap_or_default() {
        Command::Serve(args) => serve(config, args).await,
        Command::Generate(args) => generate(config, args).await,
    }
}

async fn serve(config: Config, args: WatchArgs) -> Result<()> {
    let state = AppState::from_config(&config);

    // ========== Playlists ==========
    if !state.sources.is_empty() {
        info!("Generating playlists on startup...");
        let updated = watch::sync_once(state.sync.clone(), state.sources.clone()).await;
        info!("Startup generation complete: {} playlist(s) updated", updated);
    }

    if args.watch {
        let period = args.period(config.playlists.watch_interval());
        tokio::spawn(watch::watch(
            state.sync.clone(),
            state.sources.clone(),
            period,
        ));
    }

    // ========== Serveur HTTP ==========
    let mut server = ServerBuilder::from_config("NSync", &config).build();
    server.add_router("/", router(state));
    server.start().await?;
    info!(
        "Endpoints: /status, /list, /hash/{{name}}, /playlist/{{name}}, /artwork/{{path}}, /stream/{{path}}, /sync/{{name}}"
    );
    server.wait().await;

    info!("Server stopped");
    Ok(())
}

async fn generate(config: Config, args: WatchArgs) -> Result<()> {
    let sync = Arc::new(config.playlist_sync());
    let sources = Arc::new(config.sources.clone());

    let updated = watch::sync_once(sync.clone(), sources.clone()).await;
    info!("Generation complete: {} playlist(s) updated", updated);

    if args.watch {
        let period = args.period(config.playlists.watch_interval());
        tokio::select! {
            _ = watch::watch(sync, sources, period) => {},
            result = signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl+C")?;
                info!("Ctrl+C received, stopping");
            }
        }
    }

    Ok(())
}
