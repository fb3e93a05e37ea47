// Concurrent writers against a file-backed pool with several connections.

mod common;

use std::collections::HashSet;
use tempfile::{tempdir, TempDir};
use tokio::task::JoinSet;

use chirp_kitchen::{
    domains::{
        cookbook::operations::{create_recipe, get_recipe, update_recipe, NewRecipe, RecipePatch},
        twitter::operations::{create_tweet, follow_user, like_tweet},
    },
    infrastructure::Database,
    AppError, AppResult,
};
use common::insert_user;

const KEYS: [&str; 10] = [
    "test", "test-1", "test-2", "test-3", "test-4", "test-5", "test-6", "test-7", "test-8",
    "test-9",
];

async fn file_backed_db() -> (TempDir, Database) {
    let dir = tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("chirp_kitchen.db").display());
    let db = Database::connect(&url).await.unwrap();
    db.initialize().await.unwrap();
    (dir, db)
}

async fn with_users(db: &Database) -> Vec<i64> {
    let mut ids = Vec::new();
    for (index, key) in KEYS.iter().enumerate() {
        ids.push(insert_user(db, key, &format!("User {}", index)).await);
    }
    ids
}

async fn collect<T: Send + 'static>(mut tasks: JoinSet<AppResult<T>>) -> (usize, Vec<AppError>) {
    let mut ok = 0;
    let mut errors = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => errors.push(e),
        }
    }
    (ok, errors)
}

async fn count(db: &Database, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(db.pool()).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tweets_and_recipe_updates_all_succeed() {
    let (_dir, db) = file_backed_db().await;
    with_users(&db).await;
    let recipe = create_recipe(&db, NewRecipe::titled("Oatmeal")).await.unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..200_i64 {
        let db = db.clone();
        let recipe_id = recipe.id;
        tasks.spawn(async move {
            if i % 2 == 0 {
                create_tweet(&db, Some("test"), "hi", &[]).await.map(|_| ())
            } else {
                let patch = RecipePatch {
                    cooking_time: Some(i),
                    ..RecipePatch::default()
                };
                update_recipe(&db, recipe_id, patch).await.map(|_| ())
            }
        });
    }

    let (ok, errors) = collect(tasks).await;
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(ok, 200);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM posts").await, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_like_race_has_one_winner_per_user() {
    let (_dir, db) = file_backed_db().await;
    with_users(&db).await;
    let tweet_id = create_tweet(&db, Some("test"), "race", &[]).await.unwrap();

    let mut tasks = JoinSet::new();
    for attempt in 0..100 {
        let db = db.clone();
        let key = KEYS[attempt % KEYS.len()];
        tasks.spawn(async move { like_tweet(&db, Some(key), tweet_id).await });
    }

    let (ok, errors) = collect(tasks).await;
    assert_eq!(ok, 10);
    assert_eq!(errors.len(), 90);
    assert!(errors.iter().all(|e| matches!(e, AppError::Conflict(_))), "{:?}", errors);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM likes").await, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_follow_race_has_one_winner_per_pair() {
    let (_dir, db) = file_backed_db().await;
    let ids = with_users(&db).await;
    let target = ids[9];

    let mut tasks = JoinSet::new();
    for attempt in 0..90 {
        let db = db.clone();
        let key = KEYS[attempt % 9];
        tasks.spawn(async move { follow_user(&db, Some(key), target).await });
    }

    let (ok, errors) = collect(tasks).await;
    assert_eq!(ok, 9);
    assert_eq!(errors.len(), 81);
    assert!(errors.iter().all(|e| matches!(e, AppError::Conflict(_))), "{:?}", errors);

    let followers: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT follower_id FROM subscriptions WHERE following_id = ?")
            .bind(target)
            .fetch_all(db.pool())
            .await
            .unwrap()
            .into_iter()
            .collect();
    assert_eq!(followers.len(), 9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_recipe_fetches_count_every_view() {
    let (_dir, db) = file_backed_db().await;
    let recipe = create_recipe(&db, NewRecipe::titled("Toast")).await.unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..50 {
        let db = db.clone();
        let recipe_id = recipe.id;
        tasks.spawn(async move { get_recipe(&db, recipe_id).await.map(|view| view.views) });
    }

    let mut seen = HashSet::new();
    while let Some(joined) = tasks.join_next().await {
        seen.insert(joined.unwrap().unwrap());
    }
    assert_eq!(seen.len(), 50);
    assert_eq!(count(&db, "SELECT views FROM recipes").await, 50);
}
