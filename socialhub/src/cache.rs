//! Async facade over the SQLite repositories.
//!
//! Every call runs on the blocking pool so the tokio workers never wait on
//! SQLite.

use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::error::{blocking, Result};
use socialhub_store::{
    CommentRepository, Database, LikeRepository, PostRepository, SearchHistoryRepository, Table,
    UserRepository,
};
use socialhub_types::{Post, SearchHistoryEntry, User};

#[derive(Clone)]
pub struct LocalCache {
    db: Database,
    users: UserRepository,
    posts: PostRepository,
    comments: CommentRepository,
    likes: LikeRepository,
    history: SearchHistoryRepository,
}

impl LocalCache {
    pub fn new(db: Database) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            posts: PostRepository::new(db.clone()),
            comments: CommentRepository::new(db.clone()),
            likes: LikeRepository::new(db.clone()),
            history: SearchHistoryRepository::new(db.clone()),
            db,
        }
    }

    /// Open (and create if needed) the cache database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    /// Fresh in-memory cache with the schema applied
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.db.subscribe(table)
    }

    pub fn comments(&self) -> &CommentRepository {
        &self.comments
    }

    pub fn likes(&self) -> &LikeRepository {
        &self.likes
    }

    // Posts

    pub async fn timeline(&self, limit: usize) -> Result<Vec<Post>> {
        let posts = self.posts.clone();
        blocking(move || posts.timeline(limit)).await
    }

    pub async fn posts_by_user(&self, user_id: i64) -> Result<Vec<Post>> {
        let posts = self.posts.clone();
        blocking(move || posts.by_user(user_id)).await
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Option<Post>> {
        let posts = self.posts.clone();
        blocking(move || posts.get_by_id(post_id)).await
    }

    pub async fn upsert_post(&self, post: Post) -> Result<()> {
        let posts = self.posts.clone();
        blocking(move || posts.upsert(&post)).await
    }

    pub async fn upsert_posts(&self, batch: Vec<Post>) -> Result<()> {
        let posts = self.posts.clone();
        blocking(move || posts.upsert_all(&batch)).await
    }

    pub async fn update_post(&self, post: Post) -> Result<()> {
        let posts = self.posts.clone();
        blocking(move || posts.update(&post)).await
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let posts = self.posts.clone();
        blocking(move || posts.delete(post_id)).await
    }

    // Users

    pub async fn users(&self) -> Result<Vec<User>> {
        let users = self.users.clone();
        blocking(move || users.list_all()).await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let users = self.users.clone();
        blocking(move || users.get_by_id(user_id)).await
    }

    pub async fn search_users_by_prefix(&self, prefix: &str) -> Result<Vec<User>> {
        let users = self.users.clone();
        let prefix = prefix.to_string();
        blocking(move || users.search_by_username_prefix(&prefix)).await
    }

    pub async fn exists_username(&self, username: &str) -> Result<bool> {
        let users = self.users.clone();
        let username = username.to_string();
        blocking(move || users.exists_username(&username)).await
    }

    /// Insert a brand-new user; fails with `UsernameTaken` on a duplicate
    pub async fn insert_user(&self, user: User) -> Result<()> {
        let users = self.users.clone();
        blocking(move || users.insert_new(&user)).await
    }

    pub async fn upsert_user(&self, user: User) -> Result<()> {
        let users = self.users.clone();
        blocking(move || users.upsert(&user)).await
    }

    pub async fn upsert_users(&self, batch: Vec<User>) -> Result<usize> {
        let users = self.users.clone();
        blocking(move || users.upsert_all(&batch)).await
    }

    pub async fn update_user(&self, user: User) -> Result<()> {
        let users = self.users.clone();
        blocking(move || users.update(&user)).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let users = self.users.clone();
        blocking(move || users.delete(user_id)).await
    }

    // Search history

    pub async fn record_search(&self, query: &str, searched_at: DateTime<Utc>) -> Result<()> {
        let history = self.history.clone();
        let query = query.to_string();
        blocking(move || history.record(&query, searched_at)).await
    }

    pub async fn recent_searches(&self, limit: usize) -> Result<Vec<SearchHistoryEntry>> {
        let history = self.history.clone();
        blocking(move || history.recent(limit)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::user;
    use crate::Error;
    use socialhub_store::StoreError;

    #[tokio::test]
    async fn test_user_round_trip() {
        let cache = LocalCache::in_memory().unwrap();
        cache.insert_user(user(1, "ann")).await.unwrap();

        assert!(cache.exists_username("ann").await.unwrap());
        assert_eq!(cache.get_user(1).await.unwrap().unwrap().username, "ann");
        assert_eq!(cache.search_users_by_prefix("an").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_surfaces_store_error() {
        let cache = LocalCache::in_memory().unwrap();
        cache.insert_user(user(1, "ann")).await.unwrap();

        let err = cache.insert_user(user(2, "ann")).await.unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::UsernameTaken(_))));
        assert_eq!(cache.users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_writes_notify_subscribers() {
        let cache = LocalCache::in_memory().unwrap();
        let mut users = cache.subscribe(Table::Users);

        cache.upsert_user(user(1, "ann")).await.unwrap();
        assert!(users.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_record_search() {
        let cache = LocalCache::in_memory().unwrap();
        cache.record_search("ann", Utc::now()).await.unwrap();
        cache.record_search("ann", Utc::now()).await.unwrap();

        let recent = cache.recent_searches(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].query, "ann");
    }
}
