use rusqlite::{params, Row};

use socialhub_types::Like;

use crate::connection::{Database, Table};
use crate::encode::{decode_dt, encode_dt};
use crate::error::Result;

fn map_like(row: &Row<'_>) -> rusqlite::Result<Like> {
    Ok(Like {
        post_id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: decode_dt(2, row.get(2)?)?,
    })
}

#[derive(Clone)]
pub struct LikeRepository {
    db: Database,
}

impl LikeRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list_all(&self) -> Result<Vec<Like>> {
        let conn = self.db.connection()?;
        let mut stmt =
            conn.prepare("SELECT post_id, user_id, created_at FROM likes ORDER BY created_at")?;
        let likes = stmt.query_map([], map_like)?.collect::<Result<Vec<_>, _>>()?;
        Ok(likes)
    }

    pub fn for_post(&self, post_id: i64) -> Result<Vec<Like>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT post_id, user_id, created_at FROM likes WHERE post_id = ?1 ORDER BY created_at",
        )?;
        let likes = stmt.query_map([post_id], map_like)?.collect::<Result<Vec<_>, _>>()?;
        Ok(likes)
    }

    pub fn by_user(&self, user_id: i64) -> Result<Vec<Like>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT post_id, user_id, created_at FROM likes WHERE user_id = ?1 ORDER BY created_at",
        )?;
        let likes = stmt.query_map([user_id], map_like)?.collect::<Result<Vec<_>, _>>()?;
        Ok(likes)
    }

    /// Insert or replace a like for its (post, user) pair
    pub fn upsert(&self, like: &Like) -> Result<()> {
        let conn = self.db.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO likes (post_id, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![like.post_id, like.user_id, encode_dt(&like.created_at)],
        )?;
        drop(conn);

        self.db.notify(Table::Likes);
        Ok(())
    }

    /// Remove a like by its composite key
    pub fn delete(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
            [post_id, user_id],
        )?;
        drop(conn);

        if changed > 0 {
            self.db.notify(Table::Likes);
        }
        Ok(changed > 0)
    }
}
