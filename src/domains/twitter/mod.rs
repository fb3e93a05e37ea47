// Microblog service: users, tweets, media, likes and subscriptions

pub mod handlers;
pub mod lookup;
pub mod media;
pub mod operations;
pub mod views;

pub use handlers::create_twitter_router;
