//! Document store for book records
//!
//! SQLite database `moodreads.db` in the root folder. Text-heavy and nested
//! fields (reviews, genres, profile, vector) are stored as JSON text columns.

pub mod books;

pub use books::{BookFieldUpdate, BookFilter, BookStore, SqliteBookStore};

use moodreads_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Creates the database file (and parent folder) if missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the books table if it doesn't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            reviews TEXT NOT NULL DEFAULT '[]',
            genres TEXT NOT NULL DEFAULT '[]',
            emotional_profile TEXT,
            emotion_vector TEXT,
            vector_version TEXT,
            source_url TEXT,
            source_id TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(title, author)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (books)");

    Ok(())
}
