//! Database and engine test utilities

use moodreads_common::config::TomlConfig;
use moodreads_engine::config::EngineConfig;
use moodreads_engine::db::{init_tables, BookStore, SqliteBookStore};
use moodreads_engine::models::{BookRecord, EmotionIntensity, EmotionProfile};
use moodreads_engine::services::{EmotionCache, TextAnalysisService};
use moodreads_engine::Engine;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Book store over a private in-memory database
pub async fn create_test_store() -> SqliteBookStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_tables(&pool).await.unwrap();
    SqliteBookStore::new(pool)
}

pub fn test_engine_config(item_timeout: Duration) -> EngineConfig {
    let mut config = EngineConfig::from_toml(Path::new("/nonexistent/moodreads"), &TomlConfig::default());
    config.item_timeout = item_timeout;
    config
}

/// Engine over an in-memory store and cache
pub async fn test_engine(service: Arc<dyn TextAnalysisService>) -> Engine {
    let store: Arc<dyn BookStore> = Arc::new(create_test_store().await);
    Engine::new(
        service,
        Arc::new(EmotionCache::in_memory()),
        store,
        &test_engine_config(Duration::from_secs(5)),
    )
}

/// Book carrying a fused profile with the given primary emotions
pub fn profiled_book(title: &str, emotions: &[(&str, f64)]) -> BookRecord {
    let mut book = BookRecord::new(title, "Test Author");
    book.emotional_profile = Some(EmotionProfile {
        primary_emotions: emotions
            .iter()
            .map(|(name, intensity)| EmotionIntensity::new(*name, *intensity))
            .collect(),
        ..Default::default()
    });
    book
}
