use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use crate::{
    app_state::AppState,
    domains::cookbook::{
        operations::{self, NewRecipe, RecipePatch, RECIPE_UPDATED},
        views::{RecipeListItem, RecipeView, UpdateRecipeResponse},
    },
    error::AppResult,
    infrastructure::middleware::{AppJson, AppPath},
};

pub fn create_cookbook_router() -> Router<AppState> {
    Router::new()
        .route("/recipe", get(list_recipes).post(create_recipe))
        .route(
            "/recipe/{id}",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
}

async fn list_recipes(State(state): State<AppState>) -> AppResult<Json<Vec<RecipeListItem>>> {
    Ok(Json(operations::list_recipes(&state.db).await?))
}

async fn create_recipe(
    State(state): State<AppState>,
    AppJson(new): AppJson<NewRecipe>,
) -> AppResult<(StatusCode, Json<RecipeView>)> {
    let recipe = operations::create_recipe(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn get_recipe(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<RecipeView>> {
    Ok(Json(operations::get_recipe(&state.db, id).await?))
}

async fn update_recipe(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<RecipePatch>,
) -> AppResult<Json<UpdateRecipeResponse>> {
    let recipe = operations::update_recipe(&state.db, id, patch).await?;
    Ok(Json(UpdateRecipeResponse {
        status: RECIPE_UPDATED.to_string(),
        recipe,
    }))
}

async fn delete_recipe(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    operations::delete_recipe(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
