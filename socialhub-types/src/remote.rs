//! Payloads returned by the remote REST API.
//!
//! Field names follow the upstream JSON (camelCase). Nested objects that some
//! endpoint variants omit fall back to their defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteUsersResponse {
    pub users: Vec<RemoteUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: RemoteAddress,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub company: RemoteCompany,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteAddress {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteCompany {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePostsResponse {
    pub posts: Vec<RemotePost>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePost {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub title: String,
    pub body: String,
    /// Absent on endpoint variants without reaction counts
    #[serde(default)]
    pub reactions: Option<RemoteReactions>,
    /// Creation time in epoch milliseconds, when the upstream provides one
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RemoteReactions {
    #[serde(default)]
    pub likes: i32,
    #[serde(default)]
    pub dislikes: i32,
}
