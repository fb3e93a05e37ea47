use std::sync::Arc;

use crate::{
    config::Config,
    error::AppResult,
    infrastructure::{
        blob_store::{BlobStore, LocalBlobStore},
        database::Database,
    },
};

/// Shared handles injected into every request.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    pub async fn new(config: &Config) -> AppResult<Self> {
        let db = Database::connect(&config.database.url).await?;
        db.initialize().await?;

        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(config.media.root.clone()));

        Ok(Self::from_parts(db, blobs))
    }

    pub fn from_parts(db: Database, blobs: Arc<dyn BlobStore>) -> Self {
        Self { db, blobs }
    }
}
