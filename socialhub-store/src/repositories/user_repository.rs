use rusqlite::{params, OptionalExtension, Row};

use socialhub_types::User;

use crate::connection::{Database, Table};
use crate::encode::escape_like;
use crate::error::{Result, StoreError};

const USER_COLUMNS: &str =
    "id, username, name, email, avatar_url, bio, followers_count, following_count, posts_count";

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        avatar_url: row.get(4)?,
        bio: row.get(5)?,
        followers_count: row.get(6)?,
        following_count: row.get(7)?,
        posts_count: row.get(8)?,
    })
}

#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All cached users, ordered by username
    pub fn list_all(&self) -> Result<Vec<User>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([], map_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))?;
        let user = stmt.query_row([user_id], map_user).optional()?;
        Ok(user)
    }

    /// Usernames starting with `prefix`, using SQLite's default LIKE comparison
    pub fn search_by_username_prefix(&self, prefix: &str) -> Result<Vec<User>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE username LIKE ?1 || '%' ESCAPE '\\' ORDER BY username ASC",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([escape_like(prefix)], map_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Check whether a username is already cached
    pub fn exists_username(&self, username: &str) -> Result<bool> {
        let conn = self.db.connection()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 LIMIT 1)",
            [username],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Insert a brand new user.
    ///
    /// The UNIQUE constraint on `username` makes this atomic: a duplicate
    /// username fails with [`StoreError::UsernameTaken`] and nothing is written.
    pub fn insert_new(&self, user: &User) -> Result<()> {
        let conn = self.db.connection()?;
        conn.execute(
            &format!(
                "INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                USER_COLUMNS
            ),
            params![
                user.id,
                user.username,
                user.name,
                user.email,
                user.avatar_url,
                user.bio,
                user.followers_count,
                user.following_count,
                user.posts_count,
            ],
        )
        .map_err(|e| StoreError::from_user_write(e, &user.username))?;
        drop(conn);

        self.db.notify(Table::Users);
        Ok(())
    }

    /// Insert or fully replace a user by id
    pub fn upsert(&self, user: &User) -> Result<()> {
        let conn = self.db.connection()?;
        Self::upsert_with(&conn, user)?;
        drop(conn);

        self.db.notify(Table::Users);
        Ok(())
    }

    /// Upsert a batch of users in one transaction.
    ///
    /// Rows whose username already belongs to a different id are skipped.
    /// Returns the number of rows written.
    pub fn upsert_all(&self, users: &[User]) -> Result<usize> {
        if users.is_empty() {
            return Ok(0);
        }

        let mut conn = self.db.connection()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        for user in users {
            match Self::upsert_with(&tx, user) {
                Ok(()) => written += 1,
                Err(StoreError::UsernameTaken(username)) => {
                    log::warn!(
                        target: "store",
                        "Skipping user {}: username '{}' belongs to another row",
                        user.id,
                        username
                    );
                }
                Err(e) => return Err(e),
            }
        }
        tx.commit()?;
        drop(conn);

        if written > 0 {
            self.db.notify(Table::Users);
        }
        Ok(written)
    }

    fn upsert_with(conn: &rusqlite::Connection, user: &User) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                    username = excluded.username,
                    name = excluded.name,
                    email = excluded.email,
                    avatar_url = excluded.avatar_url,
                    bio = excluded.bio,
                    followers_count = excluded.followers_count,
                    following_count = excluded.following_count,
                    posts_count = excluded.posts_count",
                USER_COLUMNS
            ),
            params![
                user.id,
                user.username,
                user.name,
                user.email,
                user.avatar_url,
                user.bio,
                user.followers_count,
                user.following_count,
                user.posts_count,
            ],
        )
        .map_err(|e| StoreError::from_user_write(e, &user.username))?;
        Ok(())
    }

    /// Update an existing user
    pub fn update(&self, user: &User) -> Result<()> {
        let conn = self.db.connection()?;
        let changed = conn
            .execute(
                "UPDATE users SET username = ?2, name = ?3, email = ?4, avatar_url = ?5, bio = ?6,
                    followers_count = ?7, following_count = ?8, posts_count = ?9
                 WHERE id = ?1",
                params![
                    user.id,
                    user.username,
                    user.name,
                    user.email,
                    user.avatar_url,
                    user.bio,
                    user.followers_count,
                    user.following_count,
                    user.posts_count,
                ],
            )
            .map_err(|e| StoreError::from_user_write(e, &user.username))?;
        drop(conn);

        if changed == 0 {
            return Err(StoreError::NotFound { table: "users", id: user.id });
        }
        self.db.notify(Table::Users);
        Ok(())
    }

    /// Delete a user. Returns whether a row was removed.
    pub fn delete(&self, user_id: i64) -> Result<bool> {
        let conn = self.db.connection()?;
        let changed = conn.execute("DELETE FROM users WHERE id = ?1", [user_id])?;
        drop(conn);

        if changed > 0 {
            self.db.notify(Table::Users);
        }
        Ok(changed > 0)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.db.connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}
