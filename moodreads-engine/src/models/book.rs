//! Book record as held by the document store

use super::{EmotionProfile, EmotionVector};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Titles treated as missing when ranking
const PLACEHOLDER_TITLES: [&str; 2] = ["unknown title", "unknown"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reviews: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub emotional_profile: Option<EmotionProfile>,
    #[serde(default)]
    pub emotion_vector: Option<EmotionVector>,
    #[serde(default)]
    pub source_url: Option<String>,
    /// External identifier (ISBN, retailer volume id, ...)
    #[serde(default)]
    pub source_id: Option<String>,
}

impl BookRecord {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            description: String::new(),
            reviews: Vec::new(),
            genres: Vec::new(),
            emotional_profile: None,
            emotion_vector: None,
            source_url: None,
            source_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_reviews<I, S>(mut self, reviews: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reviews = reviews.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Missing, blank or placeholder titles never reach recommendation output
    pub fn has_real_title(&self) -> bool {
        is_real_title(&self.title)
    }
}

pub fn is_real_title(title: &str) -> bool {
    let normalized = title.trim().to_lowercase();
    !normalized.is_empty() && !PLACEHOLDER_TITLES.contains(&normalized.as_str())
}
