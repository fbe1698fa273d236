//! Book record persistence
//!
//! `BookStore` is the narrow contract the engine relies on: find one, find
//! many, upsert keyed on (title, author), and targeted field updates. The
//! engine itself only ever writes the profile and vector fields.

use crate::models::{BookRecord, EmotionProfile, EmotionVector};
use async_trait::async_trait;
use moodreads_common::{Error, Result};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT id, title, author, description, reviews, genres, \
    emotional_profile, emotion_vector, source_url, source_id FROM books";

/// Record selection
#[derive(Debug, Clone, PartialEq)]
pub enum BookFilter {
    ById(Uuid),
    ByTitleAuthor { title: String, author: String },
    All,
    /// Books with a stored vector
    WithVector,
    /// Books not yet profiled
    MissingProfile,
}

/// Field-level update applied by `update_fields`
#[derive(Debug, Clone, PartialEq)]
pub enum BookFieldUpdate {
    EmotionProfile(EmotionProfile),
    EmotionVector(EmotionVector),
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_one(&self, filter: &BookFilter) -> Result<Option<BookRecord>>;

    async fn find(&self, filter: &BookFilter) -> Result<Vec<BookRecord>>;

    /// Insert, or replace the record with the same (title, author)
    ///
    /// # Returns
    /// Id of the stored record (the existing id when replacing)
    async fn insert_or_replace(&self, record: &BookRecord) -> Result<Uuid>;

    async fn update_fields(&self, id: Uuid, updates: &[BookFieldUpdate]) -> Result<()>;
}

/// SQLite-backed `BookStore`
#[derive(Clone)]
pub struct SqliteBookStore {
    pool: SqlitePool,
}

impl SqliteBookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_rows(&self, filter: &BookFilter, single: bool) -> Result<Vec<SqliteRow>> {
        let limit = if single { " LIMIT 1" } else { "" };

        let rows = match filter {
            BookFilter::ById(id) => {
                let sql = format!("{} WHERE id = ?{}", SELECT_COLUMNS, limit);
                sqlx::query(&sql)
                    .bind(id.to_string())
                    .fetch_all(&self.pool)
                    .await?
            }
            BookFilter::ByTitleAuthor { title, author } => {
                let sql = format!("{} WHERE title = ? AND author = ?{}", SELECT_COLUMNS, limit);
                sqlx::query(&sql)
                    .bind(title)
                    .bind(author)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookFilter::All => {
                let sql = format!("{} ORDER BY rowid{}", SELECT_COLUMNS, limit);
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
            BookFilter::WithVector => {
                let sql = format!(
                    "{} WHERE emotion_vector IS NOT NULL ORDER BY rowid{}",
                    SELECT_COLUMNS, limit
                );
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
            BookFilter::MissingProfile => {
                let sql = format!(
                    "{} WHERE emotional_profile IS NULL ORDER BY rowid{}",
                    SELECT_COLUMNS, limit
                );
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        Ok(rows)
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn find_one(&self, filter: &BookFilter) -> Result<Option<BookRecord>> {
        let rows = self.fetch_rows(filter, true).await?;
        rows.first().map(row_to_book).transpose()
    }

    async fn find(&self, filter: &BookFilter) -> Result<Vec<BookRecord>> {
        let rows = self.fetch_rows(filter, false).await?;
        rows.iter().map(row_to_book).collect()
    }

    async fn insert_or_replace(&self, record: &BookRecord) -> Result<Uuid> {
        let profile_json = record
            .emotional_profile
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let vector_json = record
            .emotion_vector
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let vector_version = record.emotion_vector.as_ref().map(|v| v.axis_version.clone());

        let row: (String,) = sqlx::query_as(
            r#"
            INSERT INTO books (
                id, title, author, description, reviews, genres,
                emotional_profile, emotion_vector, vector_version,
                source_url, source_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(title, author) DO UPDATE SET
                description = excluded.description,
                reviews = excluded.reviews,
                genres = excluded.genres,
                emotional_profile = excluded.emotional_profile,
                emotion_vector = excluded.emotion_vector,
                vector_version = excluded.vector_version,
                source_url = excluded.source_url,
                source_id = excluded.source_id,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.title)
        .bind(&record.author)
        .bind(&record.description)
        .bind(serde_json::to_string(&record.reviews)?)
        .bind(serde_json::to_string(&record.genres)?)
        .bind(profile_json)
        .bind(vector_json)
        .bind(vector_version)
        .bind(&record.source_url)
        .bind(&record.source_id)
        .fetch_one(&self.pool)
        .await?;

        parse_id(&row.0)
    }

    async fn update_fields(&self, id: Uuid, updates: &[BookFieldUpdate]) -> Result<()> {
        // Dropping the transaction (error or cancellation) rolls every field back
        let mut tx = self.pool.begin().await?;

        for update in updates {
            let result = match update {
                BookFieldUpdate::EmotionProfile(profile) => {
                    sqlx::query(
                        "UPDATE books SET emotional_profile = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                    )
                    .bind(serde_json::to_string(profile)?)
                    .bind(id.to_string())
                    .execute(&mut *tx)
                    .await?
                }
                BookFieldUpdate::EmotionVector(vector) => {
                    sqlx::query(
                        "UPDATE books SET emotion_vector = ?, vector_version = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                    )
                    .bind(serde_json::to_string(vector)?)
                    .bind(&vector.axis_version)
                    .bind(id.to_string())
                    .execute(&mut *tx)
                    .await?
                }
            };

            if result.rows_affected() == 0 {
                return Err(Error::NotFound(format!("Book {} not found", id)));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("Invalid book id '{}': {}", raw, e)))
}

/// Decode an optional JSON column, treating corrupt content as absent
fn json_column<T: DeserializeOwned>(row: &SqliteRow, column: &str, id: &Uuid) -> Result<Option<T>> {
    let raw: Option<String> = row.try_get(column)?;
    Ok(raw.and_then(|text| match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(book_id = %id, column, error = %e, "Ignoring unreadable JSON column");
            None
        }
    }))
}

fn row_to_book(row: &SqliteRow) -> Result<BookRecord> {
    let id_raw: String = row.try_get("id")?;
    let id = parse_id(&id_raw)?;

    Ok(BookRecord {
        id,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        description: row.try_get("description")?,
        reviews: json_column(row, "reviews", &id)?.unwrap_or_default(),
        genres: json_column(row, "genres", &id)?.unwrap_or_default(),
        emotional_profile: json_column(row, "emotional_profile", &id)?,
        emotion_vector: json_column(row, "emotion_vector", &id)?,
        source_url: row.try_get("source_url")?,
        source_id: row.try_get("source_id")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmotionIntensity;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_store() -> SqliteBookStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        SqliteBookStore::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_find_one() {
        let store = setup_store().await;
        let book = BookRecord::new("Piranesi", "Susanna Clarke")
            .with_description("A house of endless halls.")
            .with_reviews(["Dreamlike", "Strange and lovely"])
            .with_genres(["fantasy"]);

        let id = store.insert_or_replace(&book).await.unwrap();
        assert_eq!(id, book.id);

        let loaded = store.find_one(&BookFilter::ById(id)).await.unwrap().unwrap();
        assert_eq!(loaded, book);
    }

    #[tokio::test]
    async fn test_upsert_keeps_existing_id() {
        let store = setup_store().await;
        let first = BookRecord::new("Dune", "Frank Herbert").with_description("old");
        let first_id = store.insert_or_replace(&first).await.unwrap();

        let second = BookRecord::new("Dune", "Frank Herbert").with_description("new");
        let second_id = store.insert_or_replace(&second).await.unwrap();

        assert_eq!(first_id, second_id);
        let all = store.find(&BookFilter::All).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description, "new");
    }

    #[tokio::test]
    async fn test_update_fields_and_filters() {
        let store = setup_store().await;
        let a = store.insert_or_replace(&BookRecord::new("A", "x")).await.unwrap();
        store.insert_or_replace(&BookRecord::new("B", "y")).await.unwrap();

        assert_eq!(store.find(&BookFilter::MissingProfile).await.unwrap().len(), 2);
        assert!(store.find(&BookFilter::WithVector).await.unwrap().is_empty());

        let profile = EmotionProfile {
            primary_emotions: vec![EmotionIntensity::new("hope", 6.0)],
            ..Default::default()
        };
        let vector = EmotionVector::normalized("v1", vec![1.0, 0.0]);
        store
            .update_fields(
                a,
                &[
                    BookFieldUpdate::EmotionProfile(profile.clone()),
                    BookFieldUpdate::EmotionVector(vector.clone()),
                ],
            )
            .await
            .unwrap();

        let missing = store.find(&BookFilter::MissingProfile).await.unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].title, "B");

        let with_vector = store.find(&BookFilter::WithVector).await.unwrap();
        assert_eq!(with_vector.len(), 1);
        assert_eq!(with_vector[0].emotional_profile, Some(profile));
        assert_eq!(with_vector[0].emotion_vector, Some(vector));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = setup_store().await;
        let result = store
            .update_fields(Uuid::new_v4(), &[BookFieldUpdate::EmotionProfile(EmotionProfile::neutral())])
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_all_fields_untouched() {
        let store = setup_store().await;
        let original_profile = EmotionProfile {
            primary_emotions: vec![EmotionIntensity::new("joy", 5.0)],
            ..Default::default()
        };
        let original_vector = EmotionVector::normalized("v1", vec![1.0, 0.0]);
        let mut book = BookRecord::new("Rebecca", "Daphne du Maurier");
        book.emotional_profile = Some(original_profile.clone());
        book.emotion_vector = Some(original_vector.clone());
        let id = store.insert_or_replace(&book).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER reject_vector BEFORE UPDATE OF emotion_vector ON books \
             BEGIN SELECT RAISE(ABORT, 'vector write rejected'); END",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let result = store
            .update_fields(
                id,
                &[
                    BookFieldUpdate::EmotionProfile(EmotionProfile {
                        primary_emotions: vec![EmotionIntensity::new("fear", 9.0)],
                        ..Default::default()
                    }),
                    BookFieldUpdate::EmotionVector(EmotionVector::normalized("v1", vec![0.0, 1.0])),
                ],
            )
            .await;
        assert!(result.is_err());

        let loaded = store.find_one(&BookFilter::ById(id)).await.unwrap().unwrap();
        assert_eq!(loaded.emotional_profile, Some(original_profile));
        assert_eq!(loaded.emotion_vector, Some(original_vector));
    }

    #[tokio::test]
    async fn test_find_by_title_author() {
        let store = setup_store().await;
        store.insert_or_replace(&BookRecord::new("Emma", "Jane Austen")).await.unwrap();

        let found = store
            .find_one(&BookFilter::ByTitleAuthor {
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
            })
            .await
            .unwrap();
        assert!(found.is_some());

        let missing = store
            .find_one(&BookFilter::ByTitleAuthor {
                title: "Emma".to_string(),
                author: "Someone Else".to_string(),
            })
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
