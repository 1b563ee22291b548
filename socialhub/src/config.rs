use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "socialhub.toml";
pub const DEFAULT_API_URL: &str = "https://dummyjson.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DATABASE_PATH: &str = "socialhub.db";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_DISPLAY_LIMIT: usize = 20;
pub const DEFAULT_DEBOUNCE_MS: u64 = 1200;

const MEMORY_DB_PATH: &str = ":memory:";

/// Environment variables and the keys they override
const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("SOCIALHUB_API_URL", "api.base_url"),
    ("SOCIALHUB_DATABASE_PATH", "database.path"),
    ("SOCIALHUB_DATA_DIR", "session.data_dir"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Relative paths live inside the data directory; `:memory:` is allowed
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Posts requested per remote refresh
    pub page_size: u32,
    /// Posts shown in the feed snapshot
    pub display_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub database: DatabaseSettings,
    pub feed: FeedSettings,
    pub search: SearchSettings,
    pub session: SessionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_API_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            database: DatabaseSettings {
                path: DEFAULT_DATABASE_PATH.to_string(),
            },
            feed: FeedSettings {
                page_size: DEFAULT_PAGE_SIZE,
                display_limit: DEFAULT_DISPLAY_LIMIT,
            },
            search: SearchSettings {
                debounce_ms: DEFAULT_DEBOUNCE_MS,
            },
            session: SessionSettings {
                data_dir: default_data_dir(),
            },
        }
    }
}

impl Settings {
    /// Load settings from `socialhub.toml` (optional) and the environment.
    ///
    /// Environment variables win over the file, which wins over defaults.
    /// A `.env` file in the working directory is read first.
    pub fn new() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load(Some(Path::new(CONFIG_FILE_NAME)), |key| std::env::var(key).ok())
    }

    /// Load settings from a specific file, ignoring the environment
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load(Some(path.as_ref()), |_| None)
    }

    pub(crate) fn load<E>(file: Option<&Path>, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_API_URL)?
            .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("database.path", DEFAULT_DATABASE_PATH)?
            .set_default("feed.page_size", DEFAULT_PAGE_SIZE as i64)?
            .set_default("feed.display_limit", DEFAULT_DISPLAY_LIMIT as i64)?
            .set_default("search.debounce_ms", DEFAULT_DEBOUNCE_MS as i64)?
            .set_default(
                "session.data_dir",
                default_data_dir().to_string_lossy().to_string(),
            )?;

        if let Some(path) = file {
            if path.exists() {
                builder = builder.add_source(File::from(path.to_path_buf()).required(false));
            }
        }

        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = env(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Where the cache database lives
    pub fn database_path(&self) -> PathBuf {
        let path = self.database.path.trim();
        if path.eq_ignore_ascii_case(MEMORY_DB_PATH) {
            return PathBuf::from(MEMORY_DB_PATH);
        }

        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.session.data_dir.join(path)
        }
    }

    pub fn uses_memory_database(&self) -> bool {
        self.database.path.trim().eq_ignore_ascii_case(MEMORY_DB_PATH)
    }
}

/// `~/.socialhub`, or a relative `.socialhub` when there is no home directory
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".socialhub"))
        .unwrap_or_else(|| PathBuf::from(".socialhub"))
}
