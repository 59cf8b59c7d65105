use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Sert une bibliothèque audio locale et synchronise ses playlists M3U8
#[derive(Debug, Parser)]
#[command(name = "nsync", version, about)]
pub struct Cli {
    /// Répertoire contenant config.yaml ou config.json
    #[arg(long, global = true, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Active les logs de niveau DEBUG
    #[arg(long, global = true)]
    pub debug: bool,

    /// N'écrit pas les lignes #EXTIMG dans les playlists
    #[arg(long, global = true)]
    pub no_artwork: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synchronise les playlists puis sert les fichiers en HTTP (par défaut)
    Serve(WatchArgs),
    /// Synchronise les playlists sans serveur HTTP
    Generate(WatchArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve(WatchArgs::default())
    }
}

#[derive(Debug, Default, Args)]
pub struct WatchArgs {
    /// Resynchronise périodiquement
    #[arg(long)]
    pub watch: bool,

    /// Période de resynchronisation en secondes
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

impl WatchArgs {
    /// Période retenue : `--interval`, sinon celle de la configuration
    pub fn period(&self, configured: Duration) -> Duration {
        self.interval.map_or(configured, Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::parse_from(["nsync", "--debug"]);
        assert!(cli.debug);
        assert!(cli.command.is_none());
        assert!(matches!(cli.command.unwrap_or_default(), Command::Serve(args) if !args.watch));
    }

    #[test]
    fn test_generate_with_watch() {
        let cli = Cli::parse_from(["nsync", "generate", "--watch", "--interval", "60", "--no-artwork"]);
        assert!(cli.no_artwork);
        match cli.command {
            Some(Command::Generate(args)) => {
                assert!(args.watch);
                assert_eq!(args.period(Duration::from_secs(300)), Duration::from_secs(60));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["nsync", "serve", "--interval", "0"]).is_err());
    }
}
