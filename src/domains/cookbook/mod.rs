pub mod handlers;
pub mod operations;
pub mod views;

pub use handlers::create_cookbook_router;
