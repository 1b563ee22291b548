use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::api::RemoteApi;
use crate::cache::LocalCache;
use crate::error::Error;
use crate::logging::SEARCH;
use crate::sync::to_user;
use socialhub_types::{SearchUsersResult, User};

pub const SEARCH_ERROR_FALLBACK: &str = "Couldn't load search results.";

/// Username search over the local cache and the remote API.
#[derive(Clone)]
pub struct UserSearch {
    api: Arc<dyn RemoteApi>,
    cache: LocalCache,
}

impl UserSearch {
    pub fn new(api: Arc<dyn RemoteApi>, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    /// Local prefix matches followed by remote matches, deduplicated by id.
    ///
    /// A blank query returns nothing without touching the cache or network.
    /// A remote failure keeps the local matches and reports an error message.
    pub async fn search(&self, query: &str) -> SearchUsersResult {
        let query = query.trim();
        if query.is_empty() {
            return SearchUsersResult::default();
        }

        let (local, remote) = tokio::join!(self.local_matches(query), self.remote_matches(query));

        if let Err(e) = self.cache.record_search(query, Utc::now()).await {
            log::warn!(target: SEARCH, "Failed to record search '{}': {}", query, e);
        }

        match remote {
            Ok(remote) => SearchUsersResult {
                users: merge_by_id(local, remote),
                error_message: None,
            },
            Err(e) => {
                log::warn!(target: SEARCH, "Remote search for '{}' failed: {}", query, e);
                SearchUsersResult {
                    users: local,
                    error_message: Some(e.user_message(SEARCH_ERROR_FALLBACK)),
                }
            }
        }
    }

    async fn local_matches(&self, query: &str) -> Vec<User> {
        self.cache
            .search_users_by_prefix(query)
            .await
            .unwrap_or_else(|e| {
                log::warn!(target: SEARCH, "Local search for '{}' failed: {}", query, e);
                Vec::new()
            })
    }

    async fn remote_matches(&self, query: &str) -> Result<Vec<User>, Error> {
        let response = self.api.search_users(query).await?;
        let users: Vec<User> = response.users.into_iter().map(to_user).collect();

        if !users.is_empty() {
            if let Err(e) = self.cache.upsert_users(users.clone()).await {
                log::warn!(target: SEARCH, "Failed to cache search results: {}", e);
            }
        }
        Ok(users)
    }
}

/// `local` then `remote`, keeping the first row seen for each id
pub fn merge_by_id(local: Vec<User>, remote: Vec<User>) -> Vec<User> {
    let mut seen = HashSet::new();
    local
        .into_iter()
        .chain(remote)
        .filter(|user| seen.insert(user.id))
        .collect()
}
