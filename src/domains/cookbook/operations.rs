// Recipe catalog operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info, warn};

use crate::domains::cookbook::views::{format_recipe, RecipeListItem, RecipeView};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::Database;
use crate::models::{Ingredient, Recipe, RecipeIngredient};

pub const RECIPE_NOT_FOUND: &str = "Recipe not found";
pub const DUPLICATE_TITLE: &str = "Recipe with this title already exists";
pub const RECIPE_UPDATED: &str = "Recipe updated";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientInput {
    pub name: String,
    #[serde(default)]
    pub quantity: f64,
}

/// Body of a create request. `id` and `views` are not accepted from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub proteins: f64,
    #[serde(default)]
    pub fats: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub cooking_time: i64,
    #[serde(default)]
    pub released: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
}

impl NewRecipe {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            vegan: false,
            calories: 0.0,
            proteins: 0.0,
            fats: 0.0,
            carbohydrates: 0.0,
            cooking_time: 0,
            released: None,
            ingredients: Vec::new(),
        }
    }
}

/// Partial update. Only the attributes listed here can change; anything else
/// in the request body, `id`, `released` and `views` included, is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub vegan: Option<bool>,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub cooking_time: Option<i64>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.vegan.is_none()
            && self.calories.is_none()
            && self.proteins.is_none()
            && self.fats.is_none()
            && self.carbohydrates.is_none()
            && self.cooking_time.is_none()
    }
}

pub async fn find_recipe_by_id(conn: &mut SqliteConnection, id: i64) -> AppResult<Recipe> {
    sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(RECIPE_NOT_FOUND.to_string()))
}

pub async fn find_recipe_by_title(conn: &mut SqliteConnection, title: &str) -> AppResult<Recipe> {
    sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE title = ?")
        .bind(title)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(RECIPE_NOT_FOUND.to_string()))
}

/// Most viewed first, quicker dishes first among equals.
pub async fn list_recipes(db: &Database) -> AppResult<Vec<RecipeListItem>> {
    let recipes = sqlx::query_as::<_, RecipeListItem>(
        "SELECT title, cooking_time, views FROM recipes ORDER BY views DESC, cooking_time ASC",
    )
    .fetch_all(db.pool())
    .await?;
    debug!("Listing {} recipes", recipes.len());
    Ok(recipes)
}

/// Link an ingredient to a recipe by name, creating the ingredient when no
/// ingredient of that name exists yet. Linking twice updates the quantity.
pub async fn link_ingredient(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    name: &str,
    quantity: f64,
) -> AppResult<RecipeIngredient> {
    let existing = sqlx::query_as::<_, Ingredient>(
        "SELECT id, name FROM ingredients WHERE name = ? ORDER BY id LIMIT 1",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    let ingredient = match existing {
        Some(ingredient) => ingredient,
        None => {
            sqlx::query_as::<_, Ingredient>(
                "INSERT INTO ingredients (name) VALUES (?) RETURNING id, name",
            )
            .bind(name)
            .fetch_one(&mut *conn)
            .await?
        }
    };

    let link = sqlx::query_as::<_, RecipeIngredient>(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity) VALUES (?, ?, ?)
         ON CONFLICT (recipe_id, ingredient_id) DO UPDATE SET quantity = excluded.quantity
         RETURNING recipe_id, ingredient_id, quantity",
    )
    .bind(recipe_id)
    .bind(ingredient.id)
    .bind(quantity)
    .fetch_one(&mut *conn)
    .await?;

    Ok(link)
}

pub async fn create_recipe(db: &Database, new: NewRecipe) -> AppResult<RecipeView> {
    let mut tx = db.begin_write().await?;

    let recipe = sqlx::query_as::<_, Recipe>(
        "INSERT INTO recipes
            (title, description, vegan, calories, proteins, fats, carbohydrates, cooking_time, released, views)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
         RETURNING *",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.vegan)
    .bind(new.calories)
    .bind(new.proteins)
    .bind(new.fats)
    .bind(new.carbohydrates)
    .bind(new.cooking_time)
    .bind(new.released.unwrap_or_else(Utc::now))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_TITLE))
    .inspect_err(|e| warn!("Recipe '{}' not created: {}", new.title, e))?;

    for line in &new.ingredients {
        link_ingredient(&mut tx, recipe.id, &line.name, line.quantity).await?;
    }

    let view = format_recipe(&mut tx, &recipe).await?;
    tx.commit().await?;

    info!("Created recipe {} '{}'", recipe.id, recipe.title);
    Ok(view)
}

/// Fetching a single recipe counts as a view. The returned recipe already
/// carries the incremented counter.
pub async fn get_recipe(db: &Database, id: i64) -> AppResult<RecipeView> {
    let mut tx = db.begin_write().await?;

    let updated = sqlx::query("UPDATE recipes SET views = views + 1 WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if updated == 0 {
        return Err(AppError::NotFound(RECIPE_NOT_FOUND.to_string()));
    }

    let recipe = find_recipe_by_id(&mut tx, id).await?;
    let view = format_recipe(&mut tx, &recipe).await?;
    tx.commit().await?;

    debug!("Recipe {} viewed {} times", id, recipe.views);
    Ok(view)
}

pub async fn update_recipe(db: &Database, id: i64, patch: RecipePatch) -> AppResult<RecipeView> {
    let mut tx = db.begin_write().await?;
    find_recipe_by_id(&mut tx, id).await?;

    if !patch.is_empty() {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE recipes SET ");
        let mut assignments = qb.separated(", ");
        if let Some(title) = patch.title {
            assignments.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = patch.description {
            assignments
                .push("description = ")
                .push_bind_unseparated(description);
        }
        if let Some(vegan) = patch.vegan {
            assignments.push("vegan = ").push_bind_unseparated(vegan);
        }
        if let Some(calories) = patch.calories {
            assignments.push("calories = ").push_bind_unseparated(calories);
        }
        if let Some(proteins) = patch.proteins {
            assignments.push("proteins = ").push_bind_unseparated(proteins);
        }
        if let Some(fats) = patch.fats {
            assignments.push("fats = ").push_bind_unseparated(fats);
        }
        if let Some(carbohydrates) = patch.carbohydrates {
            assignments
                .push("carbohydrates = ")
                .push_bind_unseparated(carbohydrates);
        }
        if let Some(cooking_time) = patch.cooking_time {
            assignments
                .push("cooking_time = ")
                .push_bind_unseparated(cooking_time);
        }
        qb.push(" WHERE id = ").push_bind(id);

        qb.build()
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_TITLE))
            .inspect_err(|e| warn!("Recipe {} not updated: {}", id, e))?;
    }

    let recipe = find_recipe_by_id(&mut tx, id).await?;
    let view = format_recipe(&mut tx, &recipe).await?;
    tx.commit().await?;

    info!("Updated recipe {}", id);
    Ok(view)
}

/// Ingredient links go with the recipe; the ingredients themselves stay.
pub async fn delete_recipe(db: &Database, id: i64) -> AppResult<()> {
    let deleted = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(db.pool())
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(AppError::NotFound(RECIPE_NOT_FOUND.to_string()));
    }

    info!("Deleted recipe {}", id);
    Ok(())
}
