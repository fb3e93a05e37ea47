// Infrastructure - storage handles and request plumbing shared by both services
pub mod blob_store;
pub mod database;
pub mod middleware;

pub use blob_store::{BlobStore, LocalBlobStore, MemoryBlobStore};
pub use database::Database;
