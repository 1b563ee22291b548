//! Persisted session state: which local profile the app acts as, and what
//! the external identity provider reported at sign-in.
//!
//! Both stores publish their value on a [`watch`] channel so view-models can
//! follow changes without polling.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;

use crate::logging::SESSION;
use crate::storage::{MemoryStorageAdapter, StorageAdapter};
use socialhub_types::AuthSession;

/// The id of the local user the app currently acts as
#[derive(Clone)]
pub struct CurrentUserStore {
    adapter: Arc<dyn StorageAdapter>,
    current: Arc<watch::Sender<Option<i64>>>,
}

impl CurrentUserStore {
    /// Load the persisted id. Unreadable or malformed values count as no user.
    pub fn new(adapter: Arc<dyn StorageAdapter>) -> Self {
        let initial = match adapter.load() {
            Ok(Some(raw)) => match raw.parse::<i64>() {
                Ok(user_id) => Some(user_id),
                Err(_) => {
                    log::warn!(target: SESSION, "Ignoring malformed current user id: {:?}", raw);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!(target: SESSION, "Failed to load current user: {:#}", e);
                None
            }
        };

        Self {
            adapter,
            current: Arc::new(watch::channel(initial).0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorageAdapter::new()))
    }

    pub fn current_user_id(&self) -> Option<i64> {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<i64>> {
        self.current.subscribe()
    }

    pub fn set_current_user_id(&self, user_id: i64) -> Result<()> {
        self.adapter
            .store(&user_id.to_string())
            .context("Failed to persist current user")?;
        self.publish(Some(user_id));
        log::info!(target: SESSION, "Current user set to {}", user_id);
        Ok(())
    }

    pub fn clear_current_user_id(&self) -> Result<()> {
        self.adapter
            .clear()
            .context("Failed to clear current user")?;
        self.publish(None);
        log::info!(target: SESSION, "Current user cleared");
        Ok(())
    }

    fn publish(&self, value: Option<i64>) {
        self.current.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }
}

/// Sign-in state from the identity provider, stored as JSON
#[derive(Clone)]
pub struct AuthSessionStore {
    adapter: Arc<dyn StorageAdapter>,
    session: Arc<watch::Sender<AuthSession>>,
}

impl AuthSessionStore {
    pub fn new(adapter: Arc<dyn StorageAdapter>) -> Self {
        let initial = match adapter.load() {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!(target: SESSION, "Ignoring malformed auth session: {}", e);
                AuthSession::default()
            }),
            Ok(None) => AuthSession::default(),
            Err(e) => {
                log::warn!(target: SESSION, "Failed to load auth session: {:#}", e);
                AuthSession::default()
            }
        };

        Self {
            adapter,
            session: Arc::new(watch::channel(initial).0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorageAdapter::new()))
    }

    pub fn session(&self) -> AuthSession {
        self.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.session.subscribe()
    }

    /// Record a successful sign-in. Blank name or email are stored as absent.
    pub fn set_logged_in(&self, name: Option<&str>, email: Option<&str>) -> Result<()> {
        let session = AuthSession {
            is_logged_in: true,
            name: non_blank(name),
            email: non_blank(email),
        };
        let raw = serde_json::to_string(&session).context("Failed to encode auth session")?;
        self.adapter
            .store(&raw)
            .context("Failed to persist auth session")?;
        self.session.send_replace(session);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.adapter
            .clear()
            .context("Failed to clear auth session")?;
        self.session.send_replace(AuthSession::default());
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
