use std::sync::Arc;

use anyhow::Context;

use crate::api::{ApiClient, RemoteApi};
use crate::cache::LocalCache;
use crate::config::Settings;
use crate::search::UserSearch;
use crate::session::{AuthSessionStore, CurrentUserStore};
use crate::storage::FileStorageAdapter;
use crate::sync::{AuthorEnricher, PostSynchronizer};

const CURRENT_USER_FILE: &str = "current_user";
const AUTH_SESSION_FILE: &str = "auth_session.json";

/// Everything a view-model needs, shared by cloning.
#[derive(Clone)]
pub struct Services {
    pub settings: Arc<Settings>,
    pub cache: LocalCache,
    pub api: Arc<dyn RemoteApi>,
    pub current_user: CurrentUserStore,
    pub auth_session: AuthSessionStore,
}

impl Services {
    pub fn new(
        settings: Settings,
        cache: LocalCache,
        api: Arc<dyn RemoteApi>,
        current_user: CurrentUserStore,
        auth_session: AuthSessionStore,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            cache,
            api,
            current_user,
            auth_session,
        }
    }

    /// Wire up the file-backed cache, session files and HTTP client
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let data_dir = settings.session.data_dir.clone();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let database_path = settings.database_path();
        let cache = LocalCache::open(&database_path)
            .with_context(|| format!("Failed to open cache at {}", database_path.display()))?;
        let api = ApiClient::from_settings(&settings.api).context("Failed to build HTTP client")?;

        let current_user =
            CurrentUserStore::new(Arc::new(FileStorageAdapter::new(data_dir.join(CURRENT_USER_FILE))));
        let auth_session =
            AuthSessionStore::new(Arc::new(FileStorageAdapter::new(data_dir.join(AUTH_SESSION_FILE))));

        log::info!(
            "Services ready: api={}, cache={}",
            settings.api.base_url,
            database_path.display()
        );
        Ok(Self::new(settings, cache, Arc::new(api), current_user, auth_session))
    }

    /// In-memory cache and session with the given remote, for tests and demos
    pub fn in_memory(api: Arc<dyn RemoteApi>) -> crate::Result<Self> {
        Ok(Self::new(
            Settings::default(),
            LocalCache::in_memory()?,
            api,
            CurrentUserStore::in_memory(),
            AuthSessionStore::in_memory(),
        ))
    }

    pub fn post_synchronizer(&self) -> PostSynchronizer {
        PostSynchronizer::new(self.api.clone(), self.cache.clone())
    }

    pub fn author_enricher(&self) -> AuthorEnricher {
        AuthorEnricher::new(self.api.clone(), self.cache.clone())
    }

    pub fn user_search(&self) -> UserSearch {
        UserSearch::new(self.api.clone(), self.cache.clone())
    }
}
