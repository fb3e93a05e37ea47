// Chirp Kitchen server

use rand::{rngs::StdRng, SeedableRng};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chirp_kitchen::{
    app_state::AppState,
    config::Config,
    data_seeder::seed_demo_data,
    domains::twitter::media::MEDIA_PREFIX,
    router::create_app_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    if config.seed_demo_data {
        let mut rng = StdRng::from_os_rng();
        seed_demo_data(&app_state.db, &mut rng).await?;
    }

    let db = app_state.db.clone();
    let app = create_app_router(app_state).nest_service(
        &format!("/{}", MEDIA_PREFIX),
        ServeDir::new(config.media.root.join(MEDIA_PREFIX)),
    );

    let addr = config.server_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Chirp Kitchen listening on http://{}", addr);
    info!("  /api/tweets, /api/users, /api/medias  microblog");
    info!("  /recipe                               recipe catalog");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
