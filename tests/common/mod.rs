#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::Utc;
use std::sync::Arc;

use chirp_kitchen::{
    app_state::AppState,
    infrastructure::{BlobStore, Database, MemoryBlobStore},
    router::create_app_router,
};

pub const API_KEY: HeaderName = HeaderName::from_static("api-key");

pub fn key(value: &'static str) -> HeaderValue {
    HeaderValue::from_static(value)
}

pub async fn create_test_server_with(blobs: Arc<dyn BlobStore>) -> (TestServer, Database) {
    let db = Database::new_in_memory().await.unwrap();
    let state = AppState::from_parts(db.clone(), blobs);
    (TestServer::new(create_app_router(state)).unwrap(), db)
}

pub async fn create_test_server() -> (TestServer, Database) {
    create_test_server_with(Arc::new(MemoryBlobStore::new())).await
}

pub async fn insert_user(db: &Database, api_key: &str, name: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (api_key, name, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(api_key)
    .bind(name)
    .bind(Utc::now())
    .fetch_one(db.pool())
    .await
    .unwrap()
}
