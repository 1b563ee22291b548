use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Timestamps are stored and exchanged as Unix epoch milliseconds
pub mod millis_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(date.timestamp_millis())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", millis)))
    }
}

mod optional_millis_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_some(&date.timestamp_millis()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<i64>::deserialize(deserializer)? {
            Some(millis) => DateTime::<Utc>::from_timestamp_millis(millis)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", millis))),
            None => Ok(None),
        }
    }
}

/// A cached user profile.
///
/// The follower/following/post counters are denormalized and are not kept in
/// step with the comment and like tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub followers_count: i32,
    pub following_count: i32,
    pub posts_count: i32,
}

impl User {
    /// `@username` handle used by the feed and profile headers
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    /// Owning user. Not enforced as a foreign key: remote posts may arrive
    /// before their author has been fetched.
    pub user_id: i64,
    pub content: String,
    #[serde(with = "millis_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "optional_millis_format")]
    pub updated_at: Option<DateTime<Utc>>,
    pub like_count: i32,
    pub dislike_count: i32,
    pub comment_count: i32,
    #[serde(default)]
    pub is_draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    #[serde(with = "millis_format")]
    pub created_at: DateTime<Utc>,
}

/// A like, keyed by (post, user)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub post_id: i64,
    pub user_id: i64,
    #[serde(with = "millis_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: i64,
    pub query: String,
    #[serde(with = "millis_format")]
    pub searched_at: DateTime<Utc>,
}

/// Login state reported by the external identity provider.
///
/// This is independent from the current local user id: one describes who
/// signed in with the provider, the other which local profile the app acts as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub is_logged_in: bool,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Merged user search results plus any non-fatal remote error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchUsersResult {
    pub users: Vec<User>,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_serializes_timestamps_as_millis() {
        let post = Post {
            id: 1,
            user_id: 9,
            content: "hi".to_string(),
            created_at: DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap(),
            updated_at: None,
            like_count: 0,
            dislike_count: 0,
            comment_count: 0,
            is_draft: false,
        };

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["created_at"], 1_700_000_000_123i64);
        assert!(json["updated_at"].is_null());

        let back: Post = serde_json::from_value(json).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn test_user_handle() {
        let user = User {
            id: 1,
            username: "ann".to_string(),
            name: "Ann Lee".to_string(),
            email: None,
            avatar_url: None,
            bio: None,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
        };
        assert_eq!(user.handle(), "@ann");
    }
}
