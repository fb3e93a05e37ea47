use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub api_key: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Directed follow edge: `follower_id` follows `following_id`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Subscription {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub follower_id: i64,
    pub following_id: i64,
}
