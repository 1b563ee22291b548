use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::api::RemoteApi;
use crate::cache::LocalCache;
use crate::error::Result;
use crate::logging::SYNC;
use crate::sync::next_local_id;
use socialhub_types::{Post, RemotePost};

/// Seconds between synthesized timestamps when the remote gives none
pub const SYNTHETIC_POST_SPACING_SECS: i64 = 60;

/// Pulls posts from the remote API into the local cache.
#[derive(Clone)]
pub struct PostSynchronizer {
    api: Arc<dyn RemoteApi>,
    cache: LocalCache,
}

impl PostSynchronizer {
    pub fn new(api: Arc<dyn RemoteApi>, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    /// Fetch the latest `limit` posts and upsert them. Never deletes rows.
    pub async fn refresh_posts(&self, limit: u32) -> Result<Vec<Post>> {
        let page = self.api.get_posts(limit).await?;
        self.persist(page.posts).await
    }

    /// Fetch one user's posts and upsert them
    pub async fn refresh_posts_for_user(&self, user_id: i64) -> Result<Vec<Post>> {
        let page = self.api.get_posts_by_user(user_id).await?;
        self.persist(page.posts).await
    }

    async fn persist(&self, remote: Vec<RemotePost>) -> Result<Vec<Post>> {
        let posts = to_posts(remote, Utc::now());
        self.cache.upsert_posts(posts.clone()).await?;
        log::debug!(target: SYNC, "Synced {} posts", posts.len());
        Ok(posts)
    }

    /// Persist a post written on this device, with a time-based local id
    pub async fn create_local_post(&self, user_id: i64, content: &str) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: next_local_id(now),
            user_id,
            content: content.trim().to_string(),
            created_at: now,
            updated_at: None,
            like_count: 0,
            dislike_count: 0,
            comment_count: 0,
            is_draft: false,
        };
        self.cache.upsert_post(post.clone()).await?;
        log::info!(target: SYNC, "Created local post {} for user {}", post.id, user_id);
        Ok(post)
    }

    pub async fn update_post(&self, post: Post) -> Result<()> {
        self.cache.update_post(post).await
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<bool> {
        self.cache.delete_post(post_id).await
    }
}

/// Map a remote page to cache rows.
///
/// Posts without a remote creation time are spaced one minute apart going
/// back from `now`, so the page keeps its order in the newest-first feed.
pub fn to_posts(remote: Vec<RemotePost>, now: DateTime<Utc>) -> Vec<Post> {
    remote
        .into_iter()
        .enumerate()
        .map(|(index, post)| {
            let created_at = post
                .created_at
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .unwrap_or_else(|| now - Duration::seconds(SYNTHETIC_POST_SPACING_SECS * index as i64));
            let reactions = post.reactions.unwrap_or_default();

            Post {
                id: post.id,
                user_id: post.user_id,
                content: post.body.trim().to_string(),
                created_at,
                updated_at: None,
                like_count: reactions.likes,
                dislike_count: reactions.dislikes,
                comment_count: 0,
                is_draft: false,
            }
        })
        .collect()
}
