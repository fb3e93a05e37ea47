// Application router - both services behind one set of layers

use axum::{middleware, response::Json, routing::get, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    domains::{cookbook::create_cookbook_router, twitter::create_twitter_router},
    infrastructure::middleware::request_context_middleware,
};

pub const SERVICE_NAME: &str = "chirp_kitchen";

pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", create_twitter_router())
        .merge(create_cookbook_router())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_context_middleware))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().timestamp_millis()
    }))
}
