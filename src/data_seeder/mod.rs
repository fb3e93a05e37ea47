// Demo data for a fresh database: a small social graph and a starter cookbook

use chrono::Utc;
use rand::{seq::IndexedRandom, Rng};
use sqlx::SqliteConnection;
use tracing::info;

use crate::{
    domains::cookbook::operations::{find_recipe_by_title, link_ingredient},
    error::AppResult,
    infrastructure::database::Database,
};

pub const DEMO_USER_COUNT: usize = 10;

const WORDS: &[&str] = &[
    "coffee", "morning", "rust", "weekend", "garden", "build", "shipped", "finally", "release",
    "rain", "train", "reading", "music", "deploy", "bug", "lunch", "sunset", "coding", "walk",
    "friday",
];

const DEMO_RECIPES: &[(&str, &str, bool, f64, f64, f64, f64, i64)] = &[
    ("Oatmeal", "Rolled oats simmered in milk", false, 300.0, 10.0, 5.0, 54.0, 15),
    ("Scrambled eggs", "Soft eggs stirred in butter", false, 250.0, 18.0, 19.0, 2.0, 10),
    ("Spaghetti Bolognese", "Pasta with a slow cooked meat sauce", false, 650.0, 32.0, 22.0, 80.0, 60),
];

const DEMO_INGREDIENTS: &[&str] = &[
    "oats", "milk", "eggs", "butter", "spaghetti", "minced beef", "tomato sauce",
];

/// Api key of the n-th demo user: `test`, then `test-1` through `test-9`.
pub fn demo_api_key(index: usize) -> String {
    if index == 0 {
        "test".to_string()
    } else {
        format!("test-{}", index)
    }
}

/// Seed each part of the store that is still empty. Running it again against
/// a populated store changes nothing.
pub async fn seed_demo_data<R: Rng + ?Sized>(db: &Database, rng: &mut R) -> AppResult<()> {
    let mut tx = db.begin_write().await?;

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await?;
    if users == 0 {
        seed_social_graph(&mut tx, rng).await?;
    }

    let recipes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
        .fetch_one(&mut *tx)
        .await?;
    if recipes == 0 {
        seed_cookbook(&mut tx).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn seed_social_graph<R: Rng + ?Sized>(
    conn: &mut SqliteConnection,
    rng: &mut R,
) -> AppResult<()> {
    let mut user_ids = Vec::with_capacity(DEMO_USER_COUNT);
    for index in 0..DEMO_USER_COUNT {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (api_key, name, created_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(demo_api_key(index))
        .bind(format!("User {}", index))
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        user_ids.push(id);
    }

    let mut subscriptions = 0;
    for &follower in &user_ids {
        let others: Vec<i64> = user_ids.iter().copied().filter(|&id| id != follower).collect();
        let amount = rng.random_range(1..=5);
        for &following in others.choose_multiple(rng, amount) {
            sqlx::query(
                "INSERT INTO subscriptions (created_at, follower_id, following_id) VALUES (?, ?, ?)",
            )
            .bind(Utc::now())
            .bind(follower)
            .bind(following)
            .execute(&mut *conn)
            .await?;
            subscriptions += 1;
        }
    }

    let mut posts = 0;
    let mut likes = 0;
    for &author in &user_ids {
        for _ in 0..rng.random_range(1..=5) {
            let content = random_sentence(rng);
            let post_id: i64 = sqlx::query_scalar(
                "INSERT INTO posts (created_at, content, user_id) VALUES (?, ?, ?) RETURNING id",
            )
            .bind(Utc::now())
            .bind(&content)
            .bind(author)
            .fetch_one(&mut *conn)
            .await?;
            posts += 1;

            let amount = rng.random_range(0..=user_ids.len() / 2);
            for &liker in user_ids.choose_multiple(rng, amount) {
                sqlx::query("INSERT INTO likes (created_at, user_id, post_id) VALUES (?, ?, ?)")
                    .bind(Utc::now())
                    .bind(liker)
                    .bind(post_id)
                    .execute(&mut *conn)
                    .await?;
                likes += 1;
            }
        }
    }

    info!(
        "Seeded {} users, {} subscriptions, {} posts, {} likes",
        user_ids.len(),
        subscriptions,
        posts,
        likes
    );
    Ok(())
}

fn random_sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let length = rng.random_range(3..=8);
    let words: Vec<&str> = (0..length)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect();
    let mut sentence = words.join(" ");
    if let Some(first) = sentence.get(..1) {
        sentence = first.to_uppercase() + &sentence[1..];
    }
    sentence
}

async fn seed_cookbook(conn: &mut SqliteConnection) -> AppResult<()> {
    for &(title, description, vegan, calories, proteins, fats, carbohydrates, cooking_time) in
        DEMO_RECIPES
    {
        sqlx::query(
            "INSERT INTO recipes
                (title, description, vegan, calories, proteins, fats, carbohydrates, cooking_time, released, views)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(title)
        .bind(description)
        .bind(vegan)
        .bind(calories)
        .bind(proteins)
        .bind(fats)
        .bind(carbohydrates)
        .bind(cooking_time)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
    }

    for name in DEMO_INGREDIENTS {
        sqlx::query("INSERT INTO ingredients (name) VALUES (?)")
            .bind(*name)
            .execute(&mut *conn)
            .await?;
    }

    let oatmeal = find_recipe_by_title(conn, "Oatmeal").await?;
    link_ingredient(conn, oatmeal.id, "oats", 100.0).await?;
    link_ingredient(conn, oatmeal.id, "milk", 400.0).await?;

    info!(
        "Seeded {} recipes and {} ingredients",
        DEMO_RECIPES.len(),
        DEMO_INGREDIENTS.len()
    );
    Ok(())
}
