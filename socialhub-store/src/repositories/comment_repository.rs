use rusqlite::{params, Row};

use socialhub_types::Comment;

use crate::connection::{Database, Table};
use crate::encode::{decode_dt, encode_dt};
use crate::error::{Result, StoreError};

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        created_at: decode_dt(4, row.get(4)?)?,
    })
}

#[derive(Clone)]
pub struct CommentRepository {
    db: Database,
}

impl CommentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list_all(&self) -> Result<Vec<Comment>> {
        self.query("SELECT id, post_id, user_id, content, created_at FROM comments ORDER BY id", None)
    }

    /// Comments on a post, oldest first
    pub fn for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.query(
            "SELECT id, post_id, user_id, content, created_at FROM comments
             WHERE post_id = ?1 ORDER BY created_at ASC",
            Some(post_id),
        )
    }

    /// Comments written by a user, newest first
    pub fn by_user(&self, user_id: i64) -> Result<Vec<Comment>> {
        self.query(
            "SELECT id, post_id, user_id, content, created_at FROM comments
             WHERE user_id = ?1 ORDER BY created_at DESC",
            Some(user_id),
        )
    }

    fn query(&self, sql: &str, key: Option<i64>) -> Result<Vec<Comment>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = match key {
            Some(key) => stmt.query_map([key], map_comment)?.collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], map_comment)?.collect::<Result<Vec<_>, _>>()?,
        };
        Ok(rows)
    }

    pub fn upsert(&self, comment: &Comment) -> Result<()> {
        self.upsert_all(std::slice::from_ref(comment))
    }

    pub fn upsert_all(&self, comments: &[Comment]) -> Result<()> {
        if comments.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.connection()?;
        let tx = conn.transaction()?;
        for comment in comments {
            tx.execute(
                "INSERT OR REPLACE INTO comments (id, post_id, user_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    comment.id,
                    comment.post_id,
                    comment.user_id,
                    comment.content,
                    encode_dt(&comment.created_at),
                ],
            )?;
        }
        tx.commit()?;
        drop(conn);

        self.db.notify(Table::Comments);
        Ok(())
    }

    pub fn update(&self, comment: &Comment) -> Result<()> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE comments SET post_id = ?2, user_id = ?3, content = ?4, created_at = ?5 WHERE id = ?1",
            params![
                comment.id,
                comment.post_id,
                comment.user_id,
                comment.content,
                encode_dt(&comment.created_at),
            ],
        )?;
        drop(conn);

        if changed == 0 {
            return Err(StoreError::NotFound { table: "comments", id: comment.id });
        }
        self.db.notify(Table::Comments);
        Ok(())
    }

    pub fn delete(&self, comment_id: i64) -> Result<bool> {
        let conn = self.db.connection()?;
        let changed = conn.execute("DELETE FROM comments WHERE id = ?1", [comment_id])?;
        drop(conn);

        if changed > 0 {
            self.db.notify(Table::Comments);
        }
        Ok(changed > 0)
    }
}
