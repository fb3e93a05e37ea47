// Database - SQLite entity store behind an explicitly passed handle
// Owns the connection pool and the relational schema for both services

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    Sqlite, Transaction,
};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Relational schema. Every statement is idempotent so `initialize` can run on
/// every boot against an existing file.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        api_key TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subscriptions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        follower_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        following_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        UNIQUE (follower_id, following_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        content TEXT NOT NULL CHECK (length(content) <= 280),
        attachments TEXT NOT NULL DEFAULT '[]',
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS media (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        url TEXT NOT NULL UNIQUE,
        post_id INTEGER REFERENCES posts(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS likes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
        UNIQUE (user_id, post_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL DEFAULT '',
        vegan INTEGER NOT NULL DEFAULT 0,
        calories REAL NOT NULL DEFAULT 0,
        proteins REAL NOT NULL DEFAULT 0,
        fats REAL NOT NULL DEFAULT 0,
        carbohydrates REAL NOT NULL DEFAULT 0,
        cooking_time INTEGER NOT NULL DEFAULT 0,
        released TEXT NOT NULL,
        views INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ingredients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recipe_ingredients (
        recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
        ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
        quantity REAL NOT NULL DEFAULT 0,
        PRIMARY KEY (recipe_id, ingredient_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_subscriptions_following ON subscriptions(following_id)",
    "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_media_post ON media(post_id)",
    "CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id)",
    "CREATE INDEX IF NOT EXISTS idx_recipes_views ON recipes(views DESC, cooking_time)",
    "CREATE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name)",
];

/// Handle to the entity store. Cloning is cheap: the pool is reference counted.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::ConfigurationError(format!(
                    "Invalid database url '{}': {}",
                    database_url, e
                ))
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to {}: {}", database_url, e))
            })?;

        Ok(Self { pool })
    }

    /// In-memory store for tests. An in-memory SQLite database lives and dies
    /// with its connection, so the pool is pinned to a single connection that
    /// is never recycled.
    pub async fn new_in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::ConfigurationError(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to in-memory SQLite: {}", e))
            })?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn initialize(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema: {}", e)))?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// One unit of work that will write. The write lock is taken up front
    /// (`BEGIN IMMEDIATE`), so a competing writer waits out the busy timeout
    /// instead of failing when a read inside the transaction is followed by a
    /// write. Dropping the transaction without committing rolls it back.
    pub async fn begin_write(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
