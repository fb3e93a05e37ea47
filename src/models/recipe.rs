use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub vegan: bool,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbohydrates: f64,
    /// Minutes.
    pub cooking_time: i64,
    pub released: DateTime<Utc>,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

/// Join row between a recipe and an ingredient, carrying the quantity.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RecipeIngredient {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub quantity: f64,
}
