use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::format::{placeholder_handle, placeholder_name, relative_age};
use crate::logging::SYNC;
use crate::services::Services;
use crate::sync::{distinct_author_ids, FetchedAuthors};
use crate::task_scope::TaskScope;
use socialhub_store::Table;
use socialhub_types::{Post, User};

pub const FEED_ERROR_FALLBACK: &str = "Couldn't refresh the feed.";

/// One row of the feed, ready to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    pub id: i64,
    pub user_id: i64,
    pub author: String,
    pub handle: String,
    pub avatar_url: Option<String>,
    pub body: String,
    /// Relative age such as `5m`
    pub stamp: String,
    pub like_count: i32,
    pub dislike_count: i32,
    pub comment_count: i32,
    /// Written by the current user
    pub is_own: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedUiState {
    pub posts: Vec<FeedPost>,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub current_user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SyncStatus {
    /// Refreshes in flight
    pending: usize,
    error_message: Option<String>,
}

impl SyncStatus {
    fn is_loading(&self) -> bool {
        self.pending > 0
    }
}

/// Home feed: cached posts joined with their authors, kept current while
/// refreshes run in the background.
pub struct FeedViewModel {
    services: Services,
    status: Arc<watch::Sender<SyncStatus>>,
    fetched_authors: Arc<Mutex<FetchedAuthors>>,
    state: watch::Receiver<FeedUiState>,
    scope: TaskScope,
}

impl FeedViewModel {
    /// Start composing the feed and run the first refresh.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(services: Services) -> Self {
        let status = Arc::new(watch::channel(SyncStatus::default()).0);
        let (state_tx, state) = watch::channel(FeedUiState {
            is_loading: true,
            current_user_id: services.current_user.current_user_id(),
            ..Default::default()
        });

        let view_model = Self {
            services,
            status,
            fetched_authors: Arc::new(Mutex::new(FetchedAuthors::new())),
            state,
            scope: TaskScope::new(),
        };
        // Refresh first so the composer never sees an idle status at startup
        view_model.refresh();
        view_model.scope.spawn(compose_feed(
            view_model.services.clone(),
            view_model.status.subscribe(),
            state_tx,
        ));
        view_model
    }

    pub fn state(&self) -> watch::Receiver<FeedUiState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> FeedUiState {
        self.state.borrow().clone()
    }

    /// Sync the latest posts, then fetch any authors not cached yet.
    ///
    /// Failures keep the cached feed and surface as `error_message`.
    pub fn refresh(&self) {
        // Mark loading before the task starts so callers never observe a gap
        self.status.send_modify(|status| {
            status.pending += 1;
            status.error_message = None;
        });
        self.scope.spawn(refresh_feed(
            self.services.clone(),
            self.status.clone(),
            self.fetched_authors.clone(),
        ));
    }
}

async fn refresh_feed(
    services: Services,
    status: Arc<watch::Sender<SyncStatus>>,
    fetched_authors: Arc<Mutex<FetchedAuthors>>,
) {
    let page_size = services.settings.feed.page_size;
    let error_message = match services.post_synchronizer().refresh_posts(page_size).await {
        Ok(posts) => {
            let author_ids = distinct_author_ids(&posts);
            let mut fetched = fetched_authors.lock().await;
            services
                .author_enricher()
                .fetch_missing(&author_ids, &mut fetched)
                .await;
            None
        }
        Err(e) => {
            log::warn!(target: SYNC, "Feed refresh failed: {}", e);
            Some(e.user_message(FEED_ERROR_FALLBACK))
        }
    };

    status.send_modify(|status| {
        status.pending = status.pending.saturating_sub(1);
        status.error_message = error_message;
    });
}

/// Rebuild the snapshot whenever posts, users, sync status or the current
/// user change.
async fn compose_feed(
    services: Services,
    mut status: watch::Receiver<SyncStatus>,
    state: watch::Sender<FeedUiState>,
) {
    let cache = services.cache.clone();
    let limit = services.settings.feed.display_limit;
    let mut posts_changed = cache.subscribe(Table::Posts);
    let mut users_changed = cache.subscribe(Table::Users);
    let mut session = services.current_user.subscribe();

    loop {
        // Mark every source seen before reading, so a write that lands
        // mid-query triggers another pass.
        posts_changed.borrow_and_update();
        users_changed.borrow_and_update();
        let sync_status = status.borrow_and_update().clone();
        let current_user_id = *session.borrow_and_update();

        match load_feed(&cache, limit).await {
            Ok((posts, users)) => {
                state.send_replace(build_feed_state(
                    posts,
                    &users,
                    &sync_status,
                    current_user_id,
                    Utc::now(),
                ));
            }
            Err(e) => {
                log::warn!(target: SYNC, "Failed to read feed from cache: {}", e);
                state.send_modify(|snapshot| {
                    snapshot.is_loading = sync_status.is_loading();
                    snapshot.error_message = sync_status.error_message.clone();
                    snapshot.current_user_id = current_user_id;
                });
            }
        }

        tokio::select! {
            changed = posts_changed.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = users_changed.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = session.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

async fn load_feed(cache: &LocalCache, limit: usize) -> Result<(Vec<Post>, Vec<User>)> {
    let posts = cache.timeline(limit).await?;
    let users = cache.users().await?;
    Ok((posts, users))
}

fn build_feed_state(
    posts: Vec<Post>,
    users: &[User],
    status: &SyncStatus,
    current_user_id: Option<i64>,
    now: DateTime<Utc>,
) -> FeedUiState {
    let authors: HashMap<i64, &User> = users.iter().map(|user| (user.id, user)).collect();

    let posts = posts
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.user_id);
            FeedPost {
                id: post.id,
                user_id: post.user_id,
                author: author
                    .map(|user| user.name.clone())
                    .unwrap_or_else(|| placeholder_name(post.user_id)),
                handle: author
                    .map(|user| user.handle())
                    .unwrap_or_else(|| placeholder_handle(post.user_id)),
                avatar_url: author.and_then(|user| user.avatar_url.clone()),
                stamp: relative_age(post.created_at, now),
                body: post.content,
                like_count: post.like_count,
                dislike_count: post.dislike_count,
                comment_count: post.comment_count,
                is_own: current_user_id == Some(post.user_id),
            }
        })
        .collect();

    FeedUiState {
        posts,
        is_loading: status.is_loading(),
        error_message: status.error_message.clone(),
        current_user_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(id: i64, user_id: i64, minutes_ago: i64, now: DateTime<Utc>) -> Post {
        Post {
            id,
            user_id,
            content: format!("post {}", id),
            created_at: now - Duration::minutes(minutes_ago),
            updated_at: None,
            like_count: 2,
            dislike_count: 1,
            comment_count: 0,
            is_draft: false,
        }
    }

    #[test]
    fn test_build_feed_state_joins_authors() {
        let now = Utc::now();
        let author = User {
            id: 9,
            username: "emilys".to_string(),
            name: "Emily Johnson".to_string(),
            email: None,
            avatar_url: Some("https://i.pravatar.cc/150?u=emilys".to_string()),
            bio: None,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
        };

        let state = build_feed_state(
            vec![post(1, 9, 5, now), post(2, 4, 90, now)],
            &[author],
            &SyncStatus::default(),
            Some(9),
            now,
        );

        let first = &state.posts[0];
        assert_eq!(first.author, "Emily Johnson");
        assert_eq!(first.handle, "@emilys");
        assert_eq!(first.stamp, "5m");
        assert!(first.is_own);

        let second = &state.posts[1];
        assert_eq!(second.author, "User 4");
        assert_eq!(second.handle, "@user4");
        assert_eq!(second.avatar_url, None);
        assert_eq!(second.stamp, "1h");
        assert!(!second.is_own);

        assert!(!state.is_loading);
        assert_eq!(state.current_user_id, Some(9));
    }

    #[test]
    fn test_status_flags_carry_into_snapshot() {
        let status = SyncStatus {
            pending: 1,
            error_message: Some("offline".to_string()),
        };
        let state = build_feed_state(Vec::new(), &[], &status, None, Utc::now());
        assert!(state.is_loading);
        assert_eq!(state.error_message.as_deref(), Some("offline"));
        assert!(state.posts.is_empty());
    }
}
