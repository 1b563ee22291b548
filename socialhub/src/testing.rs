//! In-process stand-in for the remote API, shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiError, ApiResult, RemoteApi};
use socialhub_types::{
    RemoteAddress, RemoteCompany, RemotePost, RemotePostsResponse, RemoteUser,
    RemoteUsersResponse, User,
};

#[derive(Default)]
pub struct FakeApi {
    posts: Mutex<Vec<RemotePost>>,
    users: Mutex<HashMap<i64, RemoteUser>>,
    search_results: Mutex<Vec<RemoteUser>>,
    posts_error: Mutex<Option<String>>,
    search_error: Mutex<Option<String>>,
    failing_users: Mutex<HashSet<i64>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn set_posts(&self, posts: Vec<RemotePost>) {
        *self.posts.lock().unwrap() = posts;
    }

    pub fn add_user(&self, user: RemoteUser) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn set_search_results(&self, users: Vec<RemoteUser>) {
        *self.search_results.lock().unwrap() = users;
    }

    pub fn fail_posts_with(&self, message: &str) {
        *self.posts_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_search_with(&self, message: &str) {
        *self.search_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_user(&self, user_id: i64) {
        self.failing_users.lock().unwrap().insert(user_id);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn posts_page(&self, filter: impl Fn(&RemotePost) -> bool) -> ApiResult<RemotePostsResponse> {
        if let Some(message) = self.posts_error.lock().unwrap().clone() {
            return Err(ApiError::Api(message));
        }
        let posts = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| filter(post))
            .cloned()
            .collect();
        Ok(RemotePostsResponse { posts })
    }
}

#[async_trait]
impl RemoteApi for FakeApi {
    async fn get_users(&self, limit: u32) -> ApiResult<RemoteUsersResponse> {
        self.record(format!("get_users {}", limit));
        let users = self.users.lock().unwrap().values().cloned().collect();
        Ok(RemoteUsersResponse { users })
    }

    async fn search_users(&self, query: &str) -> ApiResult<RemoteUsersResponse> {
        self.record(format!("search_users {}", query));
        if let Some(message) = self.search_error.lock().unwrap().clone() {
            return Err(ApiError::Api(message));
        }
        let users = self.search_results.lock().unwrap().clone();
        Ok(RemoteUsersResponse { users })
    }

    async fn get_user(&self, user_id: i64) -> ApiResult<RemoteUser> {
        self.record(format!("get_user {}", user_id));
        if self.failing_users.lock().unwrap().contains(&user_id) {
            return Err(ApiError::Api(format!("user {} unavailable", user_id)));
        }
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))
    }

    async fn get_posts(&self, limit: u32) -> ApiResult<RemotePostsResponse> {
        self.record(format!("get_posts {}", limit));
        self.posts_page(|_| true)
    }

    async fn get_posts_by_user(&self, user_id: i64) -> ApiResult<RemotePostsResponse> {
        self.record(format!("get_posts_by_user {}", user_id));
        self.posts_page(|post| post.user_id == user_id)
    }
}

pub fn remote_user(id: i64, username: &str) -> RemoteUser {
    RemoteUser {
        id,
        first_name: username.to_string(),
        last_name: "Remote".to_string(),
        username: username.to_string(),
        email: None,
        address: RemoteAddress::default(),
        university: String::new(),
        company: RemoteCompany::default(),
    }
}

pub fn remote_post(id: i64, user_id: i64, body: &str) -> RemotePost {
    RemotePost {
        id,
        user_id,
        title: String::new(),
        body: body.to_string(),
        reactions: None,
        created_at: None,
    }
}

pub fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        name: username.to_string(),
        email: None,
        avatar_url: None,
        bio: None,
        followers_count: 0,
        following_count: 0,
        posts_count: 0,
    }
}
