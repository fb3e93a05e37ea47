mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use chirp_kitchen::domains::cookbook::views::{
    RecipeListItem, RecipeView, UpdateRecipeResponse,
};
use common::create_test_server;

fn oatmeal() -> Value {
    json!({
        "title": "Oatmeal",
        "description": "Porridge",
        "vegan": false,
        "calories": 300,
        "proteins": 10,
        "fats": 5,
        "carbohydrates": 54,
        "cooking_time": 15,
        "ingredients": [
            {"name": "oats", "quantity": 100},
            {"name": "milk", "quantity": 400}
        ]
    })
}

#[tokio::test]
async fn test_create_recipe_returns_created() {
    let (server, _db) = create_test_server().await;

    let response = server.post("/recipe").json(&oatmeal()).await;

    response.assert_status(StatusCode::CREATED);
    let recipe: RecipeView = response.json();
    assert!(recipe.id > 0);
    assert_eq!(recipe.views, 0);
    assert_eq!(recipe.calories, 300.0);
    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.ingredients[1].name, "milk");
}

#[tokio::test]
async fn test_create_ignores_client_views() {
    let (server, _db) = create_test_server().await;

    let recipe: RecipeView = server
        .post("/recipe")
        .json(&json!({"title": "Toast", "views": 500}))
        .await
        .json();

    assert_eq!(recipe.views, 0);
}

#[tokio::test]
async fn test_duplicate_title() {
    let (server, _db) = create_test_server().await;
    server.post("/recipe").json(&oatmeal()).await.assert_status(StatusCode::CREATED);

    let response = server.post("/recipe").json(&oatmeal()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Recipe with this title already exists");
}

#[tokio::test]
async fn test_get_recipe_counts_views() {
    let (server, _db) = create_test_server().await;
    let created: RecipeView = server.post("/recipe").json(&oatmeal()).await.json();
    let path = format!("/recipe/{}", created.id);

    let first: RecipeView = server.get(&path).await.json();
    let second: RecipeView = server.get(&path).await.json();

    assert_eq!(first.views, 1);
    assert_eq!(second.views, 2);
}

#[tokio::test]
async fn test_list_recipes_order() {
    let (server, _db) = create_test_server().await;
    let stew: RecipeView = server
        .post("/recipe")
        .json(&json!({"title": "Stew", "cooking_time": 90}))
        .await
        .json();
    let toast: RecipeView = server
        .post("/recipe")
        .json(&json!({"title": "Toast", "cooking_time": 3}))
        .await
        .json();
    server
        .post("/recipe")
        .json(&json!({"title": "Salad", "cooking_time": 10}))
        .await
        .assert_status(StatusCode::CREATED);

    server.get(&format!("/recipe/{}", stew.id)).await.assert_status_ok();
    server.get(&format!("/recipe/{}", stew.id)).await.assert_status_ok();
    server.get(&format!("/recipe/{}", toast.id)).await.assert_status_ok();

    let response = server.get("/recipe").await;
    response.assert_status_ok();
    let list: Vec<RecipeListItem> = response.json();
    let titles: Vec<&str> = list.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Stew", "Toast", "Salad"]);
    assert_eq!(list[0].views, 2);
}

#[tokio::test]
async fn test_patch_recipe() {
    let (server, _db) = create_test_server().await;
    let created: RecipeView = server.post("/recipe").json(&oatmeal()).await.json();

    let response = server
        .patch(&format!("/recipe/{}", created.id))
        .json(&json!({"title": "New Oatmeal", "id": 1000, "views": 77}))
        .await;

    response.assert_status_ok();
    let body: UpdateRecipeResponse = response.json();
    assert_eq!(body.status, "Recipe updated");
    assert_eq!(body.recipe.id, created.id);
    assert_eq!(body.recipe.title, "New Oatmeal");
    assert_eq!(body.recipe.calories, 300.0);
    assert_eq!(body.recipe.views, 0);
    assert_eq!(body.recipe.ingredients.len(), 2);
}

#[tokio::test]
async fn test_patch_missing_recipe() {
    let (server, _db) = create_test_server().await;

    let response = server.patch("/recipe/5").json(&json!({"title": "Ghost"})).await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Recipe not found");
}

#[tokio::test]
async fn test_delete_recipe() {
    let (server, _db) = create_test_server().await;
    let created: RecipeView = server.post("/recipe").json(&oatmeal()).await.json();
    let path = format!("/recipe/{}", created.id);

    server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
    server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_recipe_requests_use_the_error_shape() {
    let (server, _db) = create_test_server().await;

    let missing_title = server.post("/recipe").json(&json!({"cooking_time": 5})).await;
    missing_title.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = missing_title.json();
    assert_eq!(body["result"], false);
    assert!(body["detail"].as_str().is_some_and(|detail| !detail.is_empty()));

    let bad_id = server.get("/recipe/oatmeal").await;
    bad_id.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = bad_id.json();
    assert_eq!(body["result"], false);

    let wrong_type = server
        .patch("/recipe/1")
        .json(&json!({"cooking_time": "soon"}))
        .await;
    wrong_type.assert_status(StatusCode::BAD_REQUEST);
}
