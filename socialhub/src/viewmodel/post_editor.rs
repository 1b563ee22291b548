use chrono::Utc;

use crate::error::Result;
use crate::logging::SYNC;
use crate::services::Services;
use crate::validation::validate_post_content;
use socialhub_types::{Post, User};

pub const POST_NOT_FOUND_NOTICE: &str = "Post not found.";
pub const NOT_OWNER_NOTICE: &str = "You can only edit your own posts.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePostUiState {
    pub content: String,
    pub content_error: Option<String>,
    pub char_count: usize,
    pub is_guest: bool,
    pub user_name: Option<String>,
    pub user_handle: Option<String>,
    pub avatar_url: Option<String>,
    pub user_bio: Option<String>,
    pub posts_count: i32,
    pub followers_count: i32,
    pub following_count: i32,
    pub can_post: bool,
}

/// Draft state for a new post
pub struct CreatePostViewModel {
    services: Services,
    content: String,
}

impl CreatePostViewModel {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            content: String::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn on_content_change(&mut self, value: impl Into<String>) {
        self.content = value.into();
    }

    pub async fn ui_state(&self) -> Result<CreatePostUiState> {
        let user = current_user(&self.services).await?;
        let content_error = validate_post_content(&self.content).map(str::to_string);
        let is_guest = user.is_none();
        let can_post = !is_guest && content_error.is_none() && !self.content.trim().is_empty();

        Ok(CreatePostUiState {
            content: self.content.clone(),
            char_count: self.content.chars().count(),
            content_error,
            is_guest,
            user_name: user.as_ref().map(|u| u.name.clone()),
            user_handle: user.as_ref().map(User::handle),
            avatar_url: user.as_ref().and_then(|u| u.avatar_url.clone()),
            user_bio: user.as_ref().and_then(|u| u.bio.clone()),
            posts_count: user.as_ref().map_or(0, |u| u.posts_count),
            followers_count: user.as_ref().map_or(0, |u| u.followers_count),
            following_count: user.as_ref().map_or(0, |u| u.following_count),
            can_post,
        })
    }

    /// Save the draft as a post by the current user and clear it.
    ///
    /// Returns `None` without writing for guests and for blank or
    /// over-long drafts.
    pub async fn submit(&mut self) -> Result<Option<Post>> {
        let Some(user_id) = self.services.current_user.current_user_id() else {
            return Ok(None);
        };
        if self.content.trim().is_empty() || validate_post_content(&self.content).is_some() {
            return Ok(None);
        }

        let post = self
            .services
            .post_synchronizer()
            .create_local_post(user_id, &self.content)
            .await?;
        self.content.clear();
        Ok(Some(post))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPostUiState {
    pub content: String,
    pub content_error: Option<String>,
    pub char_count: usize,
    pub is_guest: bool,
    pub is_owner: bool,
    pub post_exists: bool,
    pub user_name: Option<String>,
    pub user_handle: Option<String>,
    pub avatar_url: Option<String>,
    /// Read-only explanation shown instead of the edit actions
    pub notice: Option<&'static str>,
    pub can_save: bool,
    pub can_delete: bool,
}

/// Edit or delete an existing post. Only its author may change it.
pub struct EditPostViewModel {
    services: Services,
    post_id: Option<i64>,
    content: String,
}

impl EditPostViewModel {
    /// Load the post; the draft starts as its current content
    pub async fn load(services: Services, post_id: Option<i64>) -> Result<Self> {
        let content = match post_id {
            Some(post_id) => services
                .cache
                .get_post(post_id)
                .await?
                .map(|post| post.content)
                .unwrap_or_default(),
            None => String::new(),
        };

        Ok(Self {
            services,
            post_id,
            content,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn on_content_change(&mut self, value: impl Into<String>) {
        self.content = value.into();
    }

    pub async fn ui_state(&self) -> Result<EditPostUiState> {
        let user = current_user(&self.services).await?;
        let post = self.post().await?;

        let content_error = validate_post_content(&self.content).map(str::to_string);
        let is_guest = user.is_none();
        let post_exists = post.is_some();
        let is_owner = matches!((&post, &user), (Some(post), Some(user)) if post.user_id == user.id);
        let notice = if !post_exists {
            Some(POST_NOT_FOUND_NOTICE)
        } else if !is_owner {
            Some(NOT_OWNER_NOTICE)
        } else {
            None
        };

        Ok(EditPostUiState {
            content: self.content.clone(),
            char_count: self.content.chars().count(),
            can_save: is_owner && content_error.is_none() && !self.content.trim().is_empty(),
            can_delete: is_owner,
            content_error,
            is_guest,
            is_owner,
            post_exists,
            user_name: user.as_ref().map(|u| u.name.clone()),
            user_handle: user.as_ref().map(User::handle),
            avatar_url: user.as_ref().and_then(|u| u.avatar_url.clone()),
            notice,
        })
    }

    /// Write the edited content. Returns `true` when the post was updated.
    pub async fn save_changes(&mut self) -> Result<bool> {
        let Some(mut post) = self.owned_post().await? else {
            return Ok(false);
        };
        let content = self.content.trim();
        if content.is_empty() || validate_post_content(&self.content).is_some() {
            return Ok(false);
        }

        post.content = content.to_string();
        post.updated_at = Some(Utc::now());
        let post_id = post.id;
        self.services.post_synchronizer().update_post(post).await?;
        log::info!(target: SYNC, "Edited post {}", post_id);
        Ok(true)
    }

    /// Delete the post. Returns `true` when a row was removed.
    pub async fn delete_post(&mut self) -> Result<bool> {
        let Some(post) = self.owned_post().await? else {
            return Ok(false);
        };
        self.services.post_synchronizer().delete_post(post.id).await
    }

    async fn post(&self) -> Result<Option<Post>> {
        match self.post_id {
            Some(post_id) => self.services.cache.get_post(post_id).await,
            None => Ok(None),
        }
    }

    /// The post, if it exists and belongs to the current user
    async fn owned_post(&self) -> Result<Option<Post>> {
        let Some(user_id) = self.services.current_user.current_user_id() else {
            return Ok(None);
        };
        Ok(self.post().await?.filter(|post| post.user_id == user_id))
    }
}

/// The signed-in user's row, if there is a session and the row is cached
async fn current_user(services: &Services) -> Result<Option<User>> {
    match services.current_user.current_user_id() {
        Some(user_id) => services.cache.get_user(user_id).await,
        None => Ok(None),
    }
}
