// Chirp Kitchen - a micro-blogging API and a recipe catalog on one SQLite store

pub mod app_state;
pub mod config;
pub mod data_seeder;
pub mod domains;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod router;

// Re-exports for convenience
pub use error::{AppError, AppResult};
