//! Client core for SocialHub.
//!
//! Layers, leaf to root: the remote REST client ([`api`]) and the local
//! SQLite cache ([`cache`]), the session stores ([`session`]), the
//! synchronization pipelines ([`sync`], [`search`]) and the per-screen
//! view-models ([`viewmodel`]) that publish immutable UI snapshots.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod search;
pub mod services;
pub mod session;
pub mod storage;
pub mod sync;
pub mod task_scope;
#[cfg(test)]
mod testing;
pub mod validation;
pub mod viewmodel;

pub use error::{Error, Result};
pub use services::Services;
