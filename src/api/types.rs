// Feed API types.
// Defines structs shared by the REST client and the local cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A feed post.
///
/// The timestamps are only present on posts read back from the local cache;
/// the store assigns them on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn new(id: i64, title: impl Into<String>, body: impl Into<String>, user_id: i64) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
            user_id,
            created_at: None,
            updated_at: None,
        }
    }
}

/// A post author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            username: username.into(),
            email: email.into(),
            created_at: None,
        }
    }
}

/// Payload for creating a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// A comment on a post, passed through exactly as the server sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Comment(pub serde_json::Value);
