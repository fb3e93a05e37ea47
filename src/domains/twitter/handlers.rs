// Microblog HTTP surface

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    app_state::AppState,
    domains::twitter::{
        lookup::find_user_by_api_key_or_id,
        media::{upload_media, MAX_UPLOAD_BYTES},
        operations,
        views::{
            format_user, list_formatted_posts, MediaResponse, ResultResponse,
            TweetCreatedResponse, TweetsResponse, UserResponse,
        },
    },
    error::{AppError, AppResult},
    infrastructure::middleware::{ApiKey, AppJson, AppPath},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTweetRequest {
    pub tweet_data: String,
    #[serde(default)]
    pub tweet_media_ids: Vec<i64>,
}

/// Routes are relative; the application mounts them under `/api`.
pub fn create_twitter_router() -> Router<AppState> {
    Router::new()
        .route("/tweets", get(list_tweets).post(create_tweet))
        .route("/tweets/{id}", axum::routing::delete(delete_tweet))
        .route("/tweets/{id}/likes", post(like_tweet).delete(unlike_tweet))
        .route("/users/me", get(read_me))
        .route("/users/{id}", get(read_user))
        .route("/users/{id}/follow", post(follow_user).delete(unfollow_user))
        .route(
            "/medias",
            post(upload_media_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

async fn list_tweets(State(state): State<AppState>) -> AppResult<Json<TweetsResponse>> {
    let mut conn = state.db.pool().acquire().await?;
    let tweets = list_formatted_posts(&mut conn).await?;
    debug!("Listing {} tweets", tweets.len());
    Ok(Json(TweetsResponse {
        result: true,
        tweets,
    }))
}

async fn read_me(State(state): State<AppState>, api_key: ApiKey) -> AppResult<Json<UserResponse>> {
    read_profile(&state, api_key.as_deref(), None).await
}

async fn read_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<UserResponse>> {
    read_profile(&state, None, Some(id)).await
}

async fn read_profile(
    state: &AppState,
    api_key: Option<&str>,
    id: Option<i64>,
) -> AppResult<Json<UserResponse>> {
    let mut conn = state.db.pool().acquire().await?;
    let user = find_user_by_api_key_or_id(&mut conn, api_key, id).await?;
    let user = format_user(&mut conn, &user).await?;
    Ok(Json(UserResponse { result: true, user }))
}

async fn upload_media_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<MediaResponse>> {
    let mut multipart = multipart?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;

        let media_id =
            upload_media(&state.db, state.blobs.as_ref(), filename.as_deref(), &bytes).await?;
        return Ok(Json(MediaResponse {
            result: true,
            media_id,
        }));
    }

    Err(AppError::Validation("Missing 'file' field".to_string()))
}

async fn create_tweet(
    State(state): State<AppState>,
    api_key: ApiKey,
    AppJson(request): AppJson<CreateTweetRequest>,
) -> AppResult<Json<TweetCreatedResponse>> {
    let tweet_id = operations::create_tweet(
        &state.db,
        api_key.as_deref(),
        &request.tweet_data,
        &request.tweet_media_ids,
    )
    .await?;
    Ok(Json(TweetCreatedResponse {
        result: true,
        tweet_id,
    }))
}

async fn delete_tweet(
    State(state): State<AppState>,
    api_key: ApiKey,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ResultResponse>> {
    operations::delete_tweet(&state.db, state.blobs.as_ref(), api_key.as_deref(), id).await?;
    Ok(Json(ResultResponse { result: true }))
}

async fn like_tweet(
    State(state): State<AppState>,
    api_key: ApiKey,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ResultResponse>> {
    operations::like_tweet(&state.db, api_key.as_deref(), id).await?;
    Ok(Json(ResultResponse { result: true }))
}

async fn unlike_tweet(
    State(state): State<AppState>,
    api_key: ApiKey,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ResultResponse>> {
    operations::unlike_tweet(&state.db, api_key.as_deref(), id).await?;
    Ok(Json(ResultResponse { result: true }))
}

async fn follow_user(
    State(state): State<AppState>,
    api_key: ApiKey,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ResultResponse>> {
    operations::follow_user(&state.db, api_key.as_deref(), id).await?;
    Ok(Json(ResultResponse { result: true }))
}

async fn unfollow_user(
    State(state): State<AppState>,
    api_key: ApiKey,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ResultResponse>> {
    operations::unfollow_user(&state.db, api_key.as_deref(), id).await?;
    Ok(Json(ResultResponse { result: true }))
}
