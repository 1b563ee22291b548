#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use socialhub::api::{ApiError, ApiResult, RemoteApi};
use socialhub::Services;
use socialhub_types::{
    RemoteAddress, RemoteCompany, RemotePost, RemotePostsResponse, RemoteUser,
    RemoteUsersResponse,
};

/// Scripted remote with call recording
#[derive(Default)]
pub struct ScriptedApi {
    posts: Mutex<Vec<RemotePost>>,
    users: Mutex<HashMap<i64, RemoteUser>>,
    search_results: Mutex<HashMap<String, Vec<RemoteUser>>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    posts_error: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_posts(&self, posts: Vec<RemotePost>) {
        *self.posts.lock().unwrap() = posts;
    }

    pub fn with_user(&self, user: RemoteUser) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn with_search(&self, query: &str, users: Vec<RemoteUser>) {
        self.search_results
            .lock()
            .unwrap()
            .insert(query.to_string(), users);
    }

    pub fn with_search_delay(&self, query: &str, delay: Duration) {
        self.search_delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
    }

    pub fn failing_posts(&self, message: &str) {
        *self.posts_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteApi for ScriptedApi {
    async fn get_users(&self, limit: u32) -> ApiResult<RemoteUsersResponse> {
        self.record(format!("get_users {}", limit));
        let users = self.users.lock().unwrap().values().cloned().collect();
        Ok(RemoteUsersResponse { users })
    }

    async fn search_users(&self, query: &str) -> ApiResult<RemoteUsersResponse> {
        self.record(format!("search_users {}", query));
        let delay = self.search_delays.lock().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let users = self
            .search_results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default();
        Ok(RemoteUsersResponse { users })
    }

    async fn get_user(&self, user_id: i64) -> ApiResult<RemoteUser> {
        self.record(format!("get_user {}", user_id));
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))
    }

    async fn get_posts(&self, limit: u32) -> ApiResult<RemotePostsResponse> {
        self.record(format!("get_posts {}", limit));
        if let Some(message) = self.posts_error.lock().unwrap().clone() {
            return Err(ApiError::Api(message));
        }
        Ok(RemotePostsResponse {
            posts: self.posts.lock().unwrap().clone(),
        })
    }

    async fn get_posts_by_user(&self, user_id: i64) -> ApiResult<RemotePostsResponse> {
        self.record(format!("get_posts_by_user {}", user_id));
        if let Some(message) = self.posts_error.lock().unwrap().clone() {
            return Err(ApiError::Api(message));
        }
        let posts = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| post.user_id == user_id)
            .cloned()
            .collect();
        Ok(RemotePostsResponse { posts })
    }
}

pub fn services(api: &Arc<ScriptedApi>) -> Services {
    Services::in_memory(api.clone()).expect("in-memory services")
}

pub fn remote_user(id: i64, first_name: &str, username: &str) -> RemoteUser {
    RemoteUser {
        id,
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        username: username.to_string(),
        email: Some(format!("{}@example.com", username)),
        address: RemoteAddress {
            city: "Lisbon".to_string(),
            country: "Portugal".to_string(),
        },
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

/// Wait until a snapshot satisfies `predicate`, failing after five seconds
pub async fn wait_for<T: Clone>(
    rx: &mut watch::Receiver<T>,
    predicate: impl FnMut(&T) -> bool,
) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .expect("state channel closed")
        .clone()
}
