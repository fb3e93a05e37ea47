// Recipe wire shapes and the ingredient resolver

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};

use crate::error::AppResult;
use crate::models::Recipe;

/// Projection used by the catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RecipeListItem {
    pub title: String,
    pub cooking_time: i64,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct IngredientLine {
    pub name: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub vegan: bool,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbohydrates: f64,
    pub cooking_time: i64,
    pub released: DateTime<Utc>,
    pub views: i64,
    pub ingredients: Vec<IngredientLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecipeResponse {
    pub status: String,
    pub recipe: RecipeView,
}

/// Flattens the join rows into name and quantity pairs, in link order.
pub async fn format_recipe(conn: &mut SqliteConnection, recipe: &Recipe) -> AppResult<RecipeView> {
    let ingredients = sqlx::query_as::<_, IngredientLine>(
        "SELECT i.name, ri.quantity FROM recipe_ingredients ri
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ?
         ORDER BY ri.rowid",
    )
    .bind(recipe.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(RecipeView {
        id: recipe.id,
        title: recipe.title.clone(),
        description: recipe.description.clone(),
        vegan: recipe.vegan,
        calories: recipe.calories,
        proteins: recipe.proteins,
        fats: recipe.fats,
        carbohydrates: recipe.carbohydrates,
        cooking_time: recipe.cooking_time,
        released: recipe.released,
        views: recipe.views,
        ingredients,
    })
}
