//! Local relational cache for the SocialHub client.
//!
//! Five tables (users, posts, comments, likes, search_history) behind typed
//! repositories. Every mutation bumps a per-table version on a
//! [`tokio::sync::watch`] channel so callers can re-run their queries when the
//! data they display changes.

pub mod connection;
mod encode;
pub mod error;
pub mod repositories;
pub mod schema;

pub use connection::{Database, DbConnection, DbPool, Table};
pub use error::{Result, StoreError};
pub use repositories::{
    CommentRepository, LikeRepository, PostRepository, SearchHistoryRepository, UserRepository,
};
