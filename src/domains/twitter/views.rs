// Association resolver - wire shapes built by walking an entity's relations

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};
use std::collections::HashMap;

use crate::error::AppResult;
use crate::models::{Post, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub followers: Vec<UserRef>,
    pub following: Vec<UserRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LikeView {
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetView {
    pub id: i64,
    pub content: String,
    pub attachments: Vec<String>,
    pub author: UserRef,
    pub likes: Vec<LikeView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub result: bool,
    pub user: UserView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetsResponse {
    pub result: bool,
    pub tweets: Vec<TweetView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetCreatedResponse {
    pub result: bool,
    pub tweet_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaResponse {
    pub result: bool,
    pub media_id: Option<i64>,
}

#[derive(FromRow)]
struct FeedRow {
    #[sqlx(flatten)]
    post: Post,
    author_name: String,
}

#[derive(FromRow)]
struct PostLikeRow {
    post_id: i64,
    user_id: i64,
    name: String,
}

/// Followers are the users on the other end of incoming subscriptions,
/// following the users on the other end of outgoing ones.
pub async fn format_user(conn: &mut SqliteConnection, user: &User) -> AppResult<UserView> {
    let followers = sqlx::query_as::<_, UserRef>(
        "SELECT u.id, u.name FROM subscriptions s
         JOIN users u ON u.id = s.follower_id
         WHERE s.following_id = ?
         ORDER BY s.id",
    )
    .bind(user.id)
    .fetch_all(&mut *conn)
    .await?;

    let following = sqlx::query_as::<_, UserRef>(
        "SELECT u.id, u.name FROM subscriptions s
         JOIN users u ON u.id = s.following_id
         WHERE s.follower_id = ?
         ORDER BY s.id",
    )
    .bind(user.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(UserView {
        id: user.id,
        name: user.name.clone(),
        followers,
        following,
    })
}

/// The single place a stored post becomes its wire shape.
fn tweet_view(post: &Post, author: UserRef, likes: Vec<LikeView>) -> TweetView {
    TweetView {
        id: post.id,
        content: post.content.clone(),
        attachments: post.attachments.0.clone(),
        author,
        likes,
    }
}

pub async fn format_post(conn: &mut SqliteConnection, post: &Post) -> AppResult<TweetView> {
    let author = sqlx::query_as::<_, UserRef>("SELECT id, name FROM users WHERE id = ?")
        .bind(post.user_id)
        .fetch_one(&mut *conn)
        .await?;

    let likes = sqlx::query_as::<_, LikeView>(
        "SELECT l.user_id, u.name FROM likes l
         JOIN users u ON u.id = l.user_id
         WHERE l.post_id = ?
         ORDER BY l.id",
    )
    .bind(post.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(tweet_view(post, author, likes))
}

/// Every tweet, newest first, resolved with two queries instead of one per tweet.
pub async fn list_formatted_posts(conn: &mut SqliteConnection) -> AppResult<Vec<TweetView>> {
    let rows = sqlx::query_as::<_, FeedRow>(
        "SELECT p.id, p.created_at, p.content, p.attachments, p.user_id, u.name AS author_name
         FROM posts p
         JOIN users u ON u.id = p.user_id
         ORDER BY p.created_at DESC, p.id DESC",
    )
    .fetch_all(&mut *conn)
    .await?;

    let like_rows = sqlx::query_as::<_, PostLikeRow>(
        "SELECT l.post_id, l.user_id, u.name FROM likes l
         JOIN users u ON u.id = l.user_id
         ORDER BY l.id",
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut likes_by_post: HashMap<i64, Vec<LikeView>> = HashMap::new();
    for like in like_rows {
        likes_by_post.entry(like.post_id).or_default().push(LikeView {
            user_id: like.user_id,
            name: like.name,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let author = UserRef {
                id: row.post.user_id,
                name: row.author_name,
            };
            let likes = likes_by_post.remove(&row.post.id).unwrap_or_default();
            tweet_view(&row.post, author, likes)
        })
        .collect())
}
