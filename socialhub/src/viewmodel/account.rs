use chrono::Utc;

use crate::error::{Error, Result};
use crate::logging::SESSION;
use crate::services::Services;
use crate::sync::next_local_id;
use crate::validation::{validate_email, validate_username, USERNAME_TAKEN_ERROR};
use socialhub_store::StoreError;
use socialhub_types::User;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUserUiState {
    pub name: String,
    pub username: String,
    pub username_error: Option<String>,
    pub email: String,
    pub avatar_url: String,
    pub bio: String,
}

/// Registration form. A successful registration becomes the current user.
pub struct CreateUserViewModel {
    services: Services,
    state: CreateUserUiState,
}

impl CreateUserViewModel {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            state: CreateUserUiState::default(),
        }
    }

    pub fn ui_state(&self) -> &CreateUserUiState {
        &self.state
    }

    pub fn on_name_change(&mut self, value: impl Into<String>) {
        self.state.name = value.into();
    }

    pub fn on_username_change(&mut self, value: impl Into<String>) {
        self.state.username = value.into();
        self.state.username_error = validate_username(&self.state.username).map(str::to_string);
    }

    pub fn on_email_change(&mut self, value: impl Into<String>) {
        self.state.email = value.into();
    }

    pub fn on_avatar_url_change(&mut self, value: impl Into<String>) {
        self.state.avatar_url = value.into();
    }

    pub fn on_bio_change(&mut self, value: impl Into<String>) {
        self.state.bio = value.into();
    }

    /// Validate and insert the user, then make them current.
    ///
    /// Returns `None` when validation fails or the username is taken; the
    /// reason is in the ui state.
    pub async fn register(&mut self) -> Result<Option<User>> {
        let name = self.state.name.trim().to_string();
        let username = self.state.username.trim().to_string();
        let username_error = validate_username(&username);
        if name.is_empty() || username.is_empty() || username_error.is_some() {
            self.state.username_error = username_error.map(str::to_string);
            return Ok(None);
        }

        let user = User {
            id: next_local_id(Utc::now()),
            username,
            name,
            email: non_blank(&self.state.email),
            avatar_url: non_blank(&self.state.avatar_url),
            bio: non_blank(&self.state.bio),
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
        };

        // The UNIQUE constraint decides; no separate existence check
        match self.services.cache.insert_user(user.clone()).await {
            Ok(()) => {}
            Err(Error::Store(StoreError::UsernameTaken(_))) => {
                self.state.username_error = Some(USERNAME_TAKEN_ERROR.to_string());
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        self.services.current_user.set_current_user_id(user.id)?;
        log::info!(target: SESSION, "Registered user {} (@{})", user.id, user.username);
        Ok(Some(user))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditUserUiState {
    pub name: String,
    pub username: String,
    pub email: String,
    pub email_error: Option<String>,
    pub avatar_url: String,
    pub bio: String,
}

/// Profile editor for the current user
pub struct EditUserViewModel {
    services: Services,
    user: Option<User>,
    state: EditUserUiState,
}

impl EditUserViewModel {
    /// Load the current user's row into the form. Guests get an empty form
    /// whose actions do nothing.
    pub async fn load(services: Services) -> Result<Self> {
        let user = match services.current_user.current_user_id() {
            Some(user_id) => services.cache.get_user(user_id).await?,
            None => None,
        };

        let state = user
            .as_ref()
            .map(|user| EditUserUiState {
                name: user.name.clone(),
                username: user.username.clone(),
                email: user.email.clone().unwrap_or_default(),
                email_error: None,
                avatar_url: user.avatar_url.clone().unwrap_or_default(),
                bio: user.bio.clone().unwrap_or_default(),
            })
            .unwrap_or_default();

        Ok(Self {
            services,
            user,
            state,
        })
    }

    pub fn ui_state(&self) -> &EditUserUiState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn on_name_change(&mut self, value: impl Into<String>) {
        self.state.name = value.into();
    }

    pub fn on_email_change(&mut self, value: impl Into<String>) {
        self.state.email = value.into();
        self.state.email_error = validate_email(&self.state.email).map(str::to_string);
    }

    pub fn on_avatar_url_change(&mut self, value: impl Into<String>) {
        self.state.avatar_url = value.into();
    }

    pub fn on_bio_change(&mut self, value: impl Into<String>) {
        self.state.bio = value.into();
    }

    /// Returns `true` when the row was updated
    pub async fn save_changes(&mut self) -> Result<bool> {
        let Some(user) = self.user.clone() else {
            return Ok(false);
        };

        let name = self.state.name.trim().to_string();
        let email_error = validate_email(&self.state.email);
        if name.is_empty() || email_error.is_some() {
            self.state.email_error = email_error.map(str::to_string);
            return Ok(false);
        }

        let updated = User {
            name,
            email: non_blank(&self.state.email),
            avatar_url: non_blank(&self.state.avatar_url),
            bio: non_blank(&self.state.bio),
            ..user
        };
        self.services.cache.update_user(updated.clone()).await?;
        self.user = Some(updated);
        Ok(true)
    }

    /// Delete the row and sign out. Returns `true` when a row was removed.
    pub async fn delete_account(&mut self) -> Result<bool> {
        let Some(user) = self.user.take() else {
            return Ok(false);
        };

        let deleted = self.services.cache.delete_user(user.id).await?;
        self.services.current_user.clear_current_user_id()?;
        log::info!(target: SESSION, "Deleted account {}", user.id);
        Ok(deleted)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
