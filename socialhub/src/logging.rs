use log::LevelFilter;
use simplelog::*;
use std::fs::File;
use std::path::PathBuf;

/// Log target for post synchronization
pub const SYNC: &str = "sync";
/// Log target for author enrichment
pub const ENRICHMENT: &str = "enrichment";
/// Log target for user search
pub const SEARCH: &str = "search";
/// Log target for session persistence
pub const SESSION: &str = "session";
/// Log target used by the cache crate
pub const STORE: &str = "store";

/// Logging configuration for the SocialHub client
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Master switch to enable/disable all logging
    pub enabled: bool,
    /// Path to the log file
    pub log_file: PathBuf,
    /// Whether to clear the log file on startup
    pub clear_on_startup: bool,
    /// Feature flags for specific logging categories
    pub features: LogFeatures,
    /// Overall log level
    pub level: LevelFilter,
}

/// Feature flags for specific logging categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFeatures {
    pub sync: bool,
    pub enrichment: bool,
    pub search: bool,
    pub session: bool,
    pub store: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("socialhub.log"),
            clear_on_startup: true,
            features: LogFeatures::default(),
            level: LevelFilter::Debug,
        }
    }
}

impl Default for LogFeatures {
    fn default() -> Self {
        Self::all(true)
    }
}

impl LogFeatures {
    fn all(enabled: bool) -> Self {
        Self {
            sync: enabled,
            enrichment: enabled,
            search: enabled,
            session: enabled,
            store: enabled,
        }
    }

    /// Targets whose records are dropped
    pub fn disabled_targets(&self) -> Vec<&'static str> {
        [
            (self.sync, SYNC),
            (self.enrichment, ENRICHMENT),
            (self.search, SEARCH),
            (self.session, SESSION),
            (self.store, STORE),
        ]
        .into_iter()
        .filter(|(enabled, _)| !enabled)
        .map(|(_, target)| target)
        .collect()
    }
}

impl LogConfig {
    /// Create a new log configuration with all features disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a minimal log configuration (only errors and warnings)
    pub fn minimal() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Warn,
            features: LogFeatures::all(false),
            ..Default::default()
        }
    }

    /// Create a verbose log configuration (all features enabled)
    pub fn verbose() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Trace,
            features: LogFeatures::all(true),
            ..Default::default()
        }
    }
}

/// Initialize the logging system with the given configuration.
///
/// Can only succeed once per process; later calls return an error.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        // Initialize with no-op logger
        let _ = WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink());
        return Ok(());
    }

    // Clear log file if requested
    if config.clear_on_startup {
        let _ = File::create(&config.log_file)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    WriteLogger::init(config.level, build_log_format(&config.features), log_file)?;

    log::info!("Logging initialized: file={}, level={:?}", config.log_file.display(), config.level);
    log::debug!("Log features: {:?}", config.features);

    Ok(())
}

fn build_log_format(features: &LogFeatures) -> Config {
    let mut builder = ConfigBuilder::new();
    let builder = builder
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder);
    for target in features.disabled_targets() {
        builder.add_filter_ignore_str(target);
    }
    builder.build()
}
