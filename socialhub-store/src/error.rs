use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An insert or update collided with the UNIQUE constraint on usernames.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("{table} row not found: {id}")]
    NotFound { table: &'static str, id: i64 },
}

impl StoreError {
    /// Translate a UNIQUE(username) violation into [`StoreError::UsernameTaken`].
    pub(crate) fn from_user_write(err: rusqlite::Error, username: &str) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::UsernameTaken(username.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
