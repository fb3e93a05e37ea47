use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};

/// Upper bound on tweet content, in characters.
pub const MAX_CONTENT_LENGTH: usize = 280;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Post {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub content: String,
    /// Media urls copied at creation time, in the order they were attached.
    pub attachments: Json<Vec<String>>,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Media {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub post_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Like {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub post_id: i64,
}
