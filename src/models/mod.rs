// Storage-shaped rows for both services. Wire shapes live next to the handlers
// that produce them.

pub mod post;
pub mod recipe;
pub mod user;

pub use post::{Like, Media, Post, MAX_CONTENT_LENGTH};
pub use recipe::{Ingredient, Recipe, RecipeIngredient};
pub use user::{Subscription, User};
