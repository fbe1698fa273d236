//! Recommendation orchestrator
//!
//! Mood text → query profile → query vector → ranked books → explanations.
//!
//! Never fails once constructed: extraction failures fall back to the
//! neutral profile and store failures yield an empty list. Both are logged.

use super::explanation::build_explanation;
use crate::db::{BookFilter, BookStore};
use crate::models::{
    match_score_percent, BookRecord, EmotionIntensity, EmotionProfile, Recommendation,
};
use crate::search::SimilarityIndex;
use crate::services::EmotionExtractor;
use crate::vectors::{EmotionVectorizer, ProfileInput, Resolution};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct RecommendationOrchestrator {
    extractor: Arc<EmotionExtractor>,
    vectorizer: Arc<EmotionVectorizer>,
    store: Arc<dyn BookStore>,
    index: SimilarityIndex,
}

impl RecommendationOrchestrator {
    pub fn new(
        extractor: Arc<EmotionExtractor>,
        vectorizer: Arc<EmotionVectorizer>,
        store: Arc<dyn BookStore>,
        index: SimilarityIndex,
    ) -> Self {
        Self {
            extractor,
            vectorizer,
            store,
            index,
        }
    }

    /// Recommend books for a free-text mood
    ///
    /// # Arguments
    /// * `mood_text` - Reader's mood, e.g. "calm and reflective"
    /// * `limit` - Requested result count; defaulted and capped by the index
    ///
    /// # Returns
    /// Ranked recommendations, possibly empty
    pub async fn recommend(&self, mood_text: &str, limit: Option<usize>) -> Vec<Recommendation> {
        let query_input = self.query_input(mood_text).await;
        let query_profile = input_as_profile(&query_input);
        let query_vector = self.vectorizer.vectorize(&query_input).await;

        let candidates = match self.store.find(&BookFilter::WithVector).await {
            Ok(books) => books,
            Err(e) => {
                error!(error = %e, "Failed to load candidate books");
                return Vec::new();
            }
        };

        let selected = self.index.select(&query_vector, &candidates, limit);
        let query_axes = self.axes_of(&query_profile.deduplicated_emotions()).await;

        let mut recommendations = Vec::with_capacity(selected.len());
        for scored in selected {
            recommendations.push(
                self.build_recommendation(scored.candidate, scored.score, &query_profile, &query_axes)
                    .await,
            );
        }

        info!(
            mood = %mood_text,
            candidates = candidates.len(),
            count = recommendations.len(),
            "Recommendations generated"
        );

        recommendations
    }

    async fn query_input(&self, mood_text: &str) -> ProfileInput {
        let outcome = self.extractor.analyze_query(mood_text).await;
        if outcome.is_error() {
            warn!(mood = %mood_text, "Mood analysis failed, using neutral profile");
            return ProfileInput::Fused(EmotionProfile::neutral());
        }
        ProfileInput::from_value(&outcome.to_value())
    }

    async fn axes_of(&self, emotions: &[EmotionIntensity]) -> HashSet<usize> {
        let mut axes = HashSet::new();
        for entry in emotions {
            if let Resolution::Axis(index) = self.vectorizer.resolver().resolve(&entry.emotion).await {
                axes.insert(index);
            }
        }
        axes
    }

    async fn build_recommendation(
        &self,
        book: &BookRecord,
        score: f64,
        query_profile: &EmotionProfile,
        query_axes: &HashSet<usize>,
    ) -> Recommendation {
        let profile = book.emotional_profile.clone().unwrap_or_default();

        let mut matching_emotions = Vec::new();
        for entry in &profile.primary_emotions {
            if let Resolution::Axis(index) = self.vectorizer.resolver().resolve(&entry.emotion).await {
                if query_axes.contains(&index) {
                    matching_emotions.push(entry.clone());
                }
            }
        }

        let explanation = build_explanation(book, &profile, query_profile, &matching_emotions);

        Recommendation {
            title: book.title.clone(),
            author: book.author.clone(),
            match_score: match_score_percent(score),
            matching_emotions,
            emotional_arc: profile.emotional_arc.clone(),
            explanation,
            source_url: book.source_url.clone().unwrap_or_default(),
        }
    }
}

/// Profile view of a vectorizer input, for explanation matching
fn input_as_profile(input: &ProfileInput) -> EmotionProfile {
    match input {
        ProfileInput::Description(profile)
        | ProfileInput::Review(profile)
        | ProfileInput::Fused(profile) => profile.clone(),
        ProfileInput::UserQuery(query) => query.to_emotion_profile(),
        ProfileInput::RawEmotionList { entries, .. } => EmotionProfile {
            primary_emotions: entries.clone(),
            ..Default::default()
        },
    }
}
