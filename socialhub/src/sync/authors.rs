use std::collections::HashSet;
use std::sync::Arc;

use crate::api::RemoteApi;
use crate::cache::LocalCache;
use crate::format::{avatar_url, build_bio};
use crate::logging::ENRICHMENT;
use socialhub_types::{RemoteUser, User};

/// Author ids already attempted in this session, successful or not.
///
/// Lives as long as the screen that owns it; a new session starts empty.
#[derive(Debug, Clone, Default)]
pub struct FetchedAuthors {
    attempted: HashSet<i64>,
}

impl FetchedAuthors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.attempted.contains(&user_id)
    }

    /// Returns `false` if the id was already marked
    pub fn mark(&mut self, user_id: i64) -> bool {
        self.attempted.insert(user_id)
    }

    pub fn len(&self) -> usize {
        self.attempted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempted.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    /// Authors fetched and cached
    pub fetched: usize,
    /// Fetches that failed; not retried this session
    pub failed: usize,
    /// Ids already attempted or already cached
    pub skipped: usize,
}

/// Fills in author rows for posts whose author has not been cached.
#[derive(Clone)]
pub struct AuthorEnricher {
    api: Arc<dyn RemoteApi>,
    cache: LocalCache,
}

impl AuthorEnricher {
    pub fn new(api: Arc<dyn RemoteApi>, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    /// Fetch each author in `user_ids` that is neither cached nor already
    /// attempted. Ids are marked before their request goes out, so a failed
    /// fetch is never retried with the same `fetched` set.
    pub async fn fetch_missing(
        &self,
        user_ids: &[i64],
        fetched: &mut FetchedAuthors,
    ) -> EnrichmentSummary {
        let mut summary = EnrichmentSummary::default();

        for &user_id in user_ids {
            if !fetched.mark(user_id) {
                summary.skipped += 1;
                continue;
            }

            match self.cache.get_user(user_id).await {
                Ok(Some(_)) => {
                    summary.skipped += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!(target: ENRICHMENT, "Cache lookup for user {} failed: {}", user_id, e);
                }
            }

            match self.api.get_user(user_id).await {
                Ok(remote) => match self.cache.upsert_user(to_user(remote)).await {
                    Ok(()) => summary.fetched += 1,
                    Err(e) => {
                        log::warn!(target: ENRICHMENT, "Failed to cache user {}: {}", user_id, e);
                        summary.failed += 1;
                    }
                },
                Err(e) => {
                    log::warn!(target: ENRICHMENT, "Failed to fetch user {}: {}", user_id, e);
                    summary.failed += 1;
                }
            }
        }

        if summary.fetched + summary.failed > 0 {
            log::debug!(
                target: ENRICHMENT,
                "Author enrichment: {} fetched, {} failed, {} skipped",
                summary.fetched,
                summary.failed,
                summary.skipped
            );
        }
        summary
    }
}

/// Map a remote user to a cache row
pub fn to_user(remote: RemoteUser) -> User {
    let name = format!("{} {}", remote.first_name.trim(), remote.last_name.trim())
        .trim()
        .to_string();
    let bio = build_bio(
        &remote.address.city,
        &remote.address.country,
        &remote.university,
        &remote.company.name,
    );

    User {
        id: remote.id,
        avatar_url: Some(avatar_url(&remote.username)),
        username: remote.username,
        name,
        email: remote.email.filter(|email| !email.trim().is_empty()),
        bio,
        followers_count: 0,
        following_count: 0,
        posts_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialhub_types::{RemoteAddress, RemoteCompany};

    #[test]
    fn test_to_user() {
        let remote = RemoteUser {
            id: 9,
            first_name: "Emily".to_string(),
            last_name: "Johnson".to_string(),
            username: "emilys".to_string(),
            email: Some("emily@x.dummyjson.com".to_string()),
            address: RemoteAddress {
                city: "Phoenix".to_string(),
                country: "United States".to_string(),
            },
            university: "University of Wisconsin".to_string(),
            company: RemoteCompany {
                name: "Dooley, Kozey and Cronin".to_string(),
            },
        };

        let user = to_user(remote);
        assert_eq!(user.name, "Emily Johnson");
        assert_eq!(user.handle(), "@emilys");
        assert_eq!(user.avatar_url.as_deref(), Some("https://i.pravatar.cc/150?u=emilys"));
        assert_eq!(
            user.bio.as_deref(),
            Some("Phoenix, United States - University of Wisconsin\nDooley, Kozey and Cronin")
        );
    }

    #[test]
    fn test_to_user_with_sparse_payload() {
        let remote = RemoteUser {
            id: 3,
            first_name: String::new(),
            last_name: "Solo".to_string(),
            username: "solo".to_string(),
            email: Some(" ".to_string()),
            address: RemoteAddress::default(),
            university: String::new(),
            company: RemoteCompany::default(),
        };

        let user = to_user(remote);
        assert_eq!(user.name, "Solo");
        assert_eq!(user.email, None);
        assert_eq!(user.bio, None);
    }

    #[test]
    fn test_fetched_authors_marks_once() {
        let mut fetched = FetchedAuthors::new();
        assert!(fetched.is_empty());
        assert!(fetched.mark(9));
        assert!(!fetched.mark(9));
        assert!(fetched.contains(9));
        assert_eq!(fetched.len(), 1);
    }
}
