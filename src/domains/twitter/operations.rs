// Write operations - tweets, likes and subscriptions

use chrono::Utc;
use sqlx::{types::Json, QueryBuilder, Sqlite};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::domains::twitter::lookup::{find_user_and_tweet, find_user_by_api_key_or_id};
use crate::error::{AppError, AppResult};
use crate::infrastructure::blob_store::BlobStore;
use crate::infrastructure::database::Database;
use crate::models::{Like, Media, Subscription, MAX_CONTENT_LENGTH};

pub const ALREADY_LIKED: &str = "You have already liked this tweet";
pub const LIKE_NOT_FOUND: &str = "Like not found";
pub const ALREADY_SUBSCRIBED: &str = "You have already subscribed to this user";
pub const SUBSCRIPTION_NOT_FOUND: &str = "Subscription not found";
pub const FORBIDDEN: &str = "Forbidden";

/// Publish a tweet for the caller and attach the given media to it.
///
/// Unknown media ids are skipped. Attached media are moved to the new tweet
/// even if another tweet held them before, and their urls are copied into
/// the tweet in the order the ids were given.
pub async fn create_tweet(
    db: &Database,
    api_key: Option<&str>,
    content: &str,
    media_ids: &[i64],
) -> AppResult<i64> {
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(AppError::Validation(format!(
            "Tweet content exceeds {} characters",
            MAX_CONTENT_LENGTH
        )));
    }

    let mut tx = db.begin_write().await?;
    let author = find_user_by_api_key_or_id(&mut tx, api_key, None).await?;

    let mut seen = HashSet::new();
    let requested: Vec<i64> = media_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let media = if requested.is_empty() {
        Vec::new()
    } else {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, created_at, url, post_id FROM media WHERE id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in &requested {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        qb.build_query_as::<Media>().fetch_all(&mut *tx).await?
    };

    let mut by_id: HashMap<i64, Media> = media.into_iter().map(|m| (m.id, m)).collect();
    let attached: Vec<Media> = requested.iter().filter_map(|id| by_id.remove(id)).collect();
    let urls: Vec<String> = attached.iter().map(|m| m.url.clone()).collect();

    let tweet_id = sqlx::query(
        "INSERT INTO posts (created_at, content, attachments, user_id) VALUES (?, ?, ?, ?)",
    )
    .bind(Utc::now())
    .bind(content)
    .bind(Json(urls))
    .bind(author.id)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    if !attached.is_empty() {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE media SET post_id = ");
        qb.push_bind(tweet_id);
        qb.push(" WHERE id IN (");
        let mut separated = qb.separated(", ");
        for m in &attached {
            separated.push_bind(m.id);
        }
        separated.push_unseparated(")");
        qb.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    if attached.len() < requested.len() {
        warn!(
            "Tweet {} skipped {} unknown media id(s)",
            tweet_id,
            requested.len() - attached.len()
        );
    }
    info!(
        "User {} created tweet {} with {} attachment(s)",
        author.id,
        tweet_id,
        attached.len()
    );
    Ok(tweet_id)
}

/// Delete the caller's own tweet together with its likes and media.
///
/// Blobs of the removed media are deleted after the commit; a blob that
/// cannot be removed is logged and left behind.
pub async fn delete_tweet(
    db: &Database,
    blobs: &dyn BlobStore,
    api_key: Option<&str>,
    tweet_id: i64,
) -> AppResult<()> {
    let mut tx = db.begin_write().await?;
    let (user, tweet) = find_user_and_tweet(&mut tx, tweet_id, api_key).await?;

    if tweet.user_id != user.id {
        warn!("User {} tried to delete tweet {} of user {}", user.id, tweet.id, tweet.user_id);
        return Err(AppError::Forbidden(FORBIDDEN.to_string()));
    }

    let urls: Vec<String> = sqlx::query_scalar("SELECT url FROM media WHERE post_id = ?")
        .bind(tweet.id)
        .fetch_all(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(tweet.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("User {} deleted tweet {}", user.id, tweet.id);

    for url in urls {
        if let Err(e) = blobs.delete(&url).await {
            warn!("Failed to delete blob {} of tweet {}: {}", url, tweet.id, e);
        }
    }
    Ok(())
}

/// Record a like. A second like of the same tweet by the same user loses on
/// the store's uniqueness constraint and is reported as a conflict.
pub async fn like_tweet(db: &Database, api_key: Option<&str>, tweet_id: i64) -> AppResult<()> {
    let mut conn = db.pool().acquire().await?;
    let (user, tweet) = find_user_and_tweet(&mut conn, tweet_id, api_key).await?;

    sqlx::query("INSERT INTO likes (created_at, user_id, post_id) VALUES (?, ?, ?)")
        .bind(Utc::now())
        .bind(user.id)
        .bind(tweet.id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, ALREADY_LIKED))
        .inspect_err(|e| warn!("Like of tweet {} by user {} rejected: {}", tweet.id, user.id, e))?;

    info!("User {} liked tweet {}", user.id, tweet.id);
    Ok(())
}

pub async fn unlike_tweet(db: &Database, api_key: Option<&str>, tweet_id: i64) -> AppResult<()> {
    let mut conn = db.pool().acquire().await?;
    let (user, tweet) = find_user_and_tweet(&mut conn, tweet_id, api_key).await?;

    let like = sqlx::query_as::<_, Like>(
        "DELETE FROM likes WHERE user_id = ? AND post_id = ?
         RETURNING id, created_at, user_id, post_id",
    )
    .bind(user.id)
    .bind(tweet.id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(LIKE_NOT_FOUND.to_string()))?;

    info!("User {} removed like {} from tweet {}", like.user_id, like.id, like.post_id);
    Ok(())
}

/// Subscribe the caller to `target_id`. Following oneself is allowed.
pub async fn follow_user(db: &Database, api_key: Option<&str>, target_id: i64) -> AppResult<()> {
    let mut conn = db.pool().acquire().await?;
    let follower = find_user_by_api_key_or_id(&mut conn, api_key, None).await?;
    let following = find_user_by_api_key_or_id(&mut conn, None, Some(target_id)).await?;

    sqlx::query(
        "INSERT INTO subscriptions (created_at, follower_id, following_id) VALUES (?, ?, ?)",
    )
    .bind(Utc::now())
    .bind(follower.id)
    .bind(following.id)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, ALREADY_SUBSCRIBED))
    .inspect_err(|e| {
        warn!("Follow of user {} by user {} rejected: {}", following.id, follower.id, e)
    })?;

    info!("User {} now follows user {}", follower.id, following.id);
    Ok(())
}

pub async fn unfollow_user(db: &Database, api_key: Option<&str>, target_id: i64) -> AppResult<()> {
    let mut conn = db.pool().acquire().await?;
    let follower = find_user_by_api_key_or_id(&mut conn, api_key, None).await?;
    let following = find_user_by_api_key_or_id(&mut conn, None, Some(target_id)).await?;

    let subscription = sqlx::query_as::<_, Subscription>(
        "DELETE FROM subscriptions WHERE follower_id = ? AND following_id = ?
         RETURNING id, created_at, follower_id, following_id",
    )
    .bind(follower.id)
    .bind(following.id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(SUBSCRIPTION_NOT_FOUND.to_string()))?;

    info!(
        "User {} unfollowed user {} (subscription {})",
        subscription.follower_id, subscription.following_id, subscription.id
    );
    Ok(())
}
