// Lookup operations - fetch-by-key with not-found semantics

use sqlx::SqliteConnection;

use crate::error::{AppError, AppResult};
use crate::models::{Post, User};

pub const USER_NOT_FOUND: &str = "User not found";
pub const TWEET_NOT_FOUND: &str = "Tweet not found";

/// Resolve a user by api key or by id.
///
/// A non-empty `api_key` takes precedence and `id` is then ignored. With no
/// usable filter at all the lookup fails exactly like an unknown key.
pub async fn find_user_by_api_key_or_id(
    conn: &mut SqliteConnection,
    api_key: Option<&str>,
    id: Option<i64>,
) -> AppResult<User> {
    let user = match (api_key.filter(|key| !key.is_empty()), id) {
        (Some(key), _) => {
            sqlx::query_as::<_, User>(
                "SELECT id, api_key, name, created_at FROM users WHERE api_key = ?",
            )
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?
        }
        (None, Some(id)) => {
            sqlx::query_as::<_, User>("SELECT id, api_key, name, created_at FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
        }
        (None, None) => None,
    };

    user.ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))
}

pub async fn find_tweet_by_id(conn: &mut SqliteConnection, id: i64) -> AppResult<Post> {
    sqlx::query_as::<_, Post>(
        "SELECT id, created_at, content, attachments, user_id FROM posts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(TWEET_NOT_FOUND.to_string()))
}

/// The caller is resolved before the tweet, so an unknown caller is reported
/// even when the tweet is missing too.
pub async fn find_user_and_tweet(
    conn: &mut SqliteConnection,
    tweet_id: i64,
    api_key: Option<&str>,
) -> AppResult<(User, Post)> {
    let user = find_user_by_api_key_or_id(conn, api_key, None).await?;
    let tweet = find_tweet_by_id(conn, tweet_id).await?;
    Ok((user, tweet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::Database;
    use chrono::Utc;

    async fn seeded() -> Database {
        let db = Database::new_in_memory().await.unwrap();
        for (key, name) in [("alice-key", "Alice"), ("bob-key", "Bob")] {
            sqlx::query("INSERT INTO users (api_key, name, created_at) VALUES (?, ?, ?)")
                .bind(key)
                .bind(name)
                .bind(Utc::now())
                .execute(db.pool())
                .await
                .unwrap();
        }
        sqlx::query("INSERT INTO posts (created_at, content, user_id) VALUES (?, 'hello', 1)")
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_find_user_by_api_key() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let user = find_user_by_api_key_or_id(&mut conn, Some("bob-key"), None)
            .await
            .unwrap();
        assert_eq!(user.name, "Bob");
    }

    #[tokio::test]
    async fn test_api_key_takes_precedence_over_id() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let user = find_user_by_api_key_or_id(&mut conn, Some("bob-key"), Some(1))
            .await
            .unwrap();
        assert_eq!(user.name, "Bob");

        let user = find_user_by_api_key_or_id(&mut conn, Some(""), Some(1))
            .await
            .unwrap();
        assert_eq!(user.name, "Alice");
    }

    #[tokio::test]
    async fn test_missing_filters_are_not_found() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = find_user_by_api_key_or_id(&mut conn, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == USER_NOT_FOUND));

        let err = find_user_by_api_key_or_id(&mut conn, Some("nope"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_user_and_tweet_reports_user_first() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = find_user_and_tweet(&mut conn, 999, Some("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == USER_NOT_FOUND));

        let err = find_user_and_tweet(&mut conn, 999, Some("alice-key"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == TWEET_NOT_FOUND));

        let (user, tweet) = find_user_and_tweet(&mut conn, 1, Some("alice-key"))
            .await
            .unwrap();
        assert_eq!(tweet.user_id, user.id);
        assert!(tweet.attachments.0.is_empty());
    }
}
