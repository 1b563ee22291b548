use rusqlite::{params, OptionalExtension, Row};

use socialhub_types::Post;

use crate::connection::{Database, Table};
use crate::encode::{decode_dt, decode_optional_dt, encode_dt};
use crate::error::{Result, StoreError};

const POST_COLUMNS: &str =
    "id, user_id, content, created_at, updated_at, like_count, dislike_count, comment_count, is_draft";

fn map_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        content: row.get(2)?,
        created_at: decode_dt(3, row.get(3)?)?,
        updated_at: decode_optional_dt(4, row.get(4)?)?,
        like_count: row.get(5)?,
        dislike_count: row.get(6)?,
        comment_count: row.get(7)?,
        is_draft: row.get(8)?,
    })
}

#[derive(Clone)]
pub struct PostRepository {
    db: Database,
}

impl PostRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Newest posts first, capped at `limit`
    pub fn timeline(&self, limit: usize) -> Result<Vec<Post>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, id DESC LIMIT ?1",
            POST_COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let posts = stmt
            .query_map([limit], map_post)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    pub fn list_all(&self) -> Result<Vec<Post>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM posts ORDER BY id", POST_COLUMNS))?;
        let posts = stmt
            .query_map([], map_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// Posts by a specific user, newest first
    pub fn by_user(&self, user_id: i64) -> Result<Vec<Post>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM posts WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        ))?;

        let posts = stmt
            .query_map([user_id], map_post)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    /// Get a single post by ID
    pub fn get_by_id(&self, post_id: i64) -> Result<Option<Post>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS))?;
        let post = stmt.query_row([post_id], map_post).optional()?;
        Ok(post)
    }

    /// Insert or fully replace a post by id
    pub fn upsert(&self, post: &Post) -> Result<()> {
        let conn = self.db.connection()?;
        Self::upsert_with(&conn, post)?;
        drop(conn);

        self.db.notify(Table::Posts);
        Ok(())
    }

    /// Insert or replace a batch of posts in a single transaction
    pub fn upsert_all(&self, posts: &[Post]) -> Result<()> {
        if posts.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.connection()?;
        let tx = conn.transaction()?;
        for post in posts {
            Self::upsert_with(&tx, post)?;
        }
        tx.commit()?;
        drop(conn);

        log::debug!(target: "store", "Upserted {} posts", posts.len());
        self.db.notify(Table::Posts);
        Ok(())
    }

    fn upsert_with(conn: &rusqlite::Connection, post: &Post) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO posts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                POST_COLUMNS
            ),
            params![
                post.id,
                post.user_id,
                post.content,
                encode_dt(&post.created_at),
                post.updated_at.as_ref().map(encode_dt),
                post.like_count,
                post.dislike_count,
                post.comment_count,
                post.is_draft,
            ],
        )?;
        Ok(())
    }

    /// Update an existing post
    pub fn update(&self, post: &Post) -> Result<()> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE posts SET user_id = ?2, content = ?3, created_at = ?4, updated_at = ?5,
                like_count = ?6, dislike_count = ?7, comment_count = ?8, is_draft = ?9
             WHERE id = ?1",
            params![
                post.id,
                post.user_id,
                post.content,
                encode_dt(&post.created_at),
                post.updated_at.as_ref().map(encode_dt),
                post.like_count,
                post.dislike_count,
                post.comment_count,
                post.is_draft,
            ],
        )?;
        drop(conn);

        if changed == 0 {
            return Err(StoreError::NotFound { table: "posts", id: post.id });
        }
        self.db.notify(Table::Posts);
        Ok(())
    }

    /// Delete a post by id. Returns whether a row was removed.
    pub fn delete(&self, post_id: i64) -> Result<bool> {
        let conn = self.db.connection()?;
        let changed = conn.execute("DELETE FROM posts WHERE id = ?1", [post_id])?;
        drop(conn);

        if changed > 0 {
            self.db.notify(Table::Posts);
        }
        Ok(changed > 0)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.db.connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn repo() -> PostRepository {
        PostRepository::new(Database::open(":memory:").expect("Failed to open database"))
    }

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(millis).unwrap()
    }

    fn post(id: i64, user_id: i64, created_at: DateTime<Utc>) -> Post {
        Post {
            id,
            user_id,
            content: format!("post {}", id),
            created_at,
            updated_at: None,
            like_count: 0,
            dislike_count: 0,
            comment_count: 0,
            is_draft: false,
        }
    }

    #[test]
    fn test_upsert_all_replaces_not_appends() {
        let repo = repo();
        let base = at(1_700_000_000_000);
        repo.upsert_all(&[post(1, 9, base), post(2, 9, base)]).unwrap();

        let mut again = post(2, 9, base);
        again.content = "edited upstream".to_string();
        repo.upsert_all(&[post(1, 9, base), again.clone(), post(3, 9, base)])
            .unwrap();

        assert_eq!(repo.count().unwrap(), 3);
        assert_eq!(repo.get_by_id(2).unwrap().unwrap(), again);
    }

    #[test]
    fn test_timeline_is_newest_first_and_limited() {
        let repo = repo();
        let base = at(1_700_000_000_000);
        repo.upsert_all(&[
            post(1, 9, base),
            post(2, 9, base + Duration::minutes(5)),
            post(3, 9, base + Duration::minutes(1)),
        ])
        .unwrap();

        let ids: Vec<i64> = repo.timeline(2).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_by_user_filters_author() {
        let repo = repo();
        let base = at(1_700_000_000_000);
        repo.upsert_all(&[post(1, 9, base), post(2, 8, base), post(3, 9, base + Duration::seconds(1))])
            .unwrap();

        let ids: Vec<i64> = repo.by_user(9).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_update_and_delete() {
        let repo = repo();
        let base = at(1_700_000_000_000);
        repo.upsert(&post(1, 9, base)).unwrap();

        let mut edited = post(1, 9, base);
        edited.content = "edited".to_string();
        edited.updated_at = Some(base + Duration::minutes(3));
        repo.update(&edited).unwrap();
        assert_eq!(repo.get_by_id(1).unwrap().unwrap(), edited);

        assert!(repo.delete(1).unwrap());
        assert!(repo.get_by_id(1).unwrap().is_none());
        assert!(matches!(
            repo.update(&edited).unwrap_err(),
            StoreError::NotFound { table: "posts", id: 1 }
        ));
    }

    #[test]
    fn test_upsert_all_notifies_once() {
        let repo = repo();
        let mut changes = repo.db.subscribe(Table::Posts);
        let base = at(1_700_000_000_000);

        repo.upsert_all(&[post(1, 9, base), post(2, 9, base)]).unwrap();
        assert_eq!(*changes.borrow_and_update(), 1);

        repo.upsert_all(&[]).unwrap();
        assert!(!changes.has_changed().unwrap());
    }
}
