//! Per-screen state holders.
//!
//! Reactive view-models (feed, search, profile) own a [`TaskScope`] and
//! publish snapshots on a `watch` channel; dropping them cancels their work.
//! Form view-models hold their fields directly and act through `&mut self`.
//!
//! [`TaskScope`]: crate::task_scope::TaskScope

pub mod account;
pub mod auth;
pub mod feed;
pub mod post_editor;
pub mod profile;
pub mod search;

pub use account::{CreateUserUiState, CreateUserViewModel, EditUserUiState, EditUserViewModel};
pub use auth::{AuthUiState, AuthViewModel};
pub use feed::{FeedPost, FeedUiState, FeedViewModel};
pub use post_editor::{CreatePostUiState, CreatePostViewModel, EditPostUiState, EditPostViewModel};
pub use profile::{ProfileUiState, ProfileViewModel};
pub use search::{SearchUiState, SearchViewModel};
