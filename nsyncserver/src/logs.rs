//! Initialisation du système de logs
//!
//! Un `Registry` tracing avec un filtre de niveau rechargeable, suivi de la
//! couche console. Le niveau peut être ajusté une fois la configuration lue.

use nsyncconfig::LoggerConfig;
use std::sync::Arc;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    Registry,
    filter::LevelFilter,
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
};

/// Options d'initialisation du système de logging
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Niveau minimal des messages émis
    pub min_level: LevelFilter,
    /// Activer la sortie vers stderr/stdout
    pub enable_console: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::INFO,
            enable_console: true,
        }
    }
}

impl LoggingOptions {
    /// Options lues depuis la section `host.logger`
    ///
    /// Un niveau inconnu retombe sur INFO.
    pub fn from_config(logger: &LoggerConfig) -> Self {
        Self {
            min_level: string_to_level(&logger.min_level)
                .map(level_to_levelfilter)
                .unwrap_or(LevelFilter::INFO),
            enable_console: logger.enable_console,
        }
    }

    /// Force le niveau DEBUG
    pub fn debug(mut self, enabled: bool) -> Self {
        if enabled {
            self.min_level = LevelFilter::DEBUG;
        }
        self
    }
}

/// Poignée pour changer le niveau de log après l'initialisation
#[derive(Clone)]
pub struct LogHandle {
    reload_handle: Arc<reload::Handle<LevelFilter, Registry>>,
}

impl LogHandle {
    /// Applique les options, typiquement une fois la configuration chargée
    ///
    /// La console est la seule sortie : la désactiver coupe tous les logs.
    pub fn apply(&self, options: &LoggingOptions) {
        let level_filter = if options.enable_console {
            options.min_level
        } else {
            LevelFilter::OFF
        };
        if let Err(e) = self.reload_handle.reload(level_filter) {
            eprintln!("Failed to reload log level filter: {}", e);
        }
    }

    pub fn max_level(&self) -> Option<LevelFilter> {
        self.reload_handle.clone_current()
    }
}

/// Registry avec filtre rechargeable et sortie console
fn build_subscriber(min_level: LevelFilter) -> (impl Subscriber + Send + Sync + 'static, LogHandle) {
    let (filter, reload_handle) = reload::Layer::new(min_level);
    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true),
    );
    let handle = LogHandle {
        reload_handle: Arc::new(reload_handle),
    };
    (subscriber, handle)
}

/// Initialise le système de logging
///
/// # Arguments
/// * `options` - Niveau et sortie console
///
/// # Retourne
/// Une [`LogHandle`] permettant de modifier le niveau à chaud. Si un
/// subscriber global est déjà installé, il est conservé.
///
/// # Exemple
/// ```rust,no_run
/// use nsyncserver::logs::{init_logging, LoggingOptions};
///
/// let handle = init_logging(LoggingOptions::default());
/// handle.apply(&LoggingOptions::default().debug(true));
/// ```
pub fn init_logging(options: LoggingOptions) -> LogHandle {
    let (subscriber, handle) = build_subscriber(options.min_level);
    if let Err(e) = subscriber.try_init() {
        eprintln!("Logging already initialized: {}", e);
    }
    handle.apply(&options);
    handle
}

/// Convertit un nom de niveau (`WARNING` et `CRITICAL` compris)
pub fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" | "CRITICAL" => Some(Level::ERROR),
        "WARN" | "WARNING" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

fn level_to_levelfilter(level: Level) -> LevelFilter {
    match level {
        Level::ERROR => LevelFilter::ERROR,
        Level::WARN => LevelFilter::WARN,
        Level::INFO => LevelFilter::INFO,
        Level::DEBUG => LevelFilter::DEBUG,
        Level::TRACE => LevelFilter::TRACE,
    }
}
