//! Batch profiling of stored books
//!
//! Books are processed one at a time: description and reviews are analyzed,
//! genres mapped, the three sources fused, the result vectorized and both
//! fields written back. Each book runs under its own timeout; a failed or
//! timed-out book is logged and skipped.

use crate::db::{BookFieldUpdate, BookFilter, BookStore};
use crate::fusion::{fuse, genres_to_emotions};
use crate::models::{BookRecord, EmotionProfile, EmotionVector};
use crate::services::{AnalysisContext, AnalysisOutcome, EmotionExtractor};
use crate::vectors::{EmotionVectorizer, AXIS_VERSION};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Which books a batch run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// Only books without a stored profile
    MissingProfile,
    /// Every book, overwriting existing profiles
    All,
}

impl BatchMode {
    fn filter(&self) -> BookFilter {
        match self {
            BatchMode::MissingProfile => BookFilter::MissingProfile,
            BatchMode::All => BookFilter::All,
        }
    }
}

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Reasons a single book could not be profiled
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{source_kind} analysis failed: {message}")]
    Analysis {
        source_kind: &'static str,
        message: String,
    },

    #[error("Store update failed: {0}")]
    Store(#[from] moodreads_common::Error),
}

pub struct BookProfiler {
    extractor: Arc<EmotionExtractor>,
    vectorizer: Arc<EmotionVectorizer>,
    store: Arc<dyn BookStore>,
    item_timeout: Duration,
}

impl BookProfiler {
    pub fn new(
        extractor: Arc<EmotionExtractor>,
        vectorizer: Arc<EmotionVectorizer>,
        store: Arc<dyn BookStore>,
        item_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            vectorizer,
            store,
            item_timeout,
        }
    }

    /// Profile every book selected by `mode`
    ///
    /// # Returns
    /// * Counters for the run (per-book failures never abort it)
    /// * Err only when the book list itself cannot be loaded
    pub async fn run(&self, mode: BatchMode) -> moodreads_common::Result<BatchSummary> {
        let books = self.store.find(&mode.filter()).await?;
        let mut summary = BatchSummary {
            total: books.len(),
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        info!(mode = ?mode, total = books.len(), "Starting batch profiling");

        for (i, book) in books.iter().enumerate() {
            match tokio::time::timeout(self.item_timeout, self.profile_book(book)).await {
                Ok(Ok(_)) => {
                    summary.succeeded += 1;
                    info!(title = %book.title, progress = i + 1, total = books.len(), "Book profiled");
                }
                Ok(Err(e)) => {
                    summary.failed += 1;
                    error!(title = %book.title, error = %e, "Failed to profile book");
                }
                Err(_) => {
                    summary.timed_out += 1;
                    warn!(title = %book.title, timeout_secs = self.item_timeout.as_secs(), "Book profiling timed out");
                }
            }
        }

        summary.finished_at = Some(Utc::now());
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            timed_out = summary.timed_out,
            "Batch profiling complete"
        );

        Ok(summary)
    }

    /// Analyze, fuse, vectorize and store one book
    pub async fn profile_book(&self, book: &BookRecord) -> Result<(EmotionProfile, EmotionVector), ProfileError> {
        let description = if book.description.trim().is_empty() {
            EmotionProfile::default()
        } else {
            let context = AnalysisContext::new(book.title.clone(), &book.genres);
            source_profile(
                "description",
                self.extractor.analyze_description(&book.description, &context).await,
            )?
        };

        let reviews = if book.reviews.iter().all(|r| r.trim().is_empty()) {
            EmotionProfile::default()
        } else {
            source_profile("reviews", self.extractor.analyze_reviews(&book.reviews).await)?
        };

        let genre_emotions = genres_to_emotions(&book.genres);
        let fused = fuse(&description, &reviews, &genre_emotions);
        let vector = self.vectorizer.vectorize_profile(&fused).await;

        self.store
            .update_fields(
                book.id,
                &[
                    BookFieldUpdate::EmotionProfile(fused.clone()),
                    BookFieldUpdate::EmotionVector(vector.clone()),
                ],
            )
            .await?;

        Ok((fused, vector))
    }

    /// Regenerate vectors that are missing or built against another axis version
    ///
    /// Only books that already have a profile are touched.
    pub async fn refresh_vectors(&self) -> moodreads_common::Result<BatchSummary> {
        let books = self.store.find(&BookFilter::All).await?;
        let stale: Vec<&BookRecord> = books
            .iter()
            .filter(|b| b.emotional_profile.is_some())
            .filter(|b| {
                b.emotion_vector
                    .as_ref()
                    .map(|v| v.axis_version != AXIS_VERSION)
                    .unwrap_or(true)
            })
            .collect();

        let mut summary = BatchSummary {
            total: stale.len(),
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        for book in stale {
            let Some(profile) = &book.emotional_profile else {
                continue;
            };
            let vector = self.vectorizer.vectorize_profile(profile).await;
            match self
                .store
                .update_fields(book.id, &[BookFieldUpdate::EmotionVector(vector)])
                .await
            {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(title = %book.title, error = %e, "Failed to refresh vector");
                }
            }
        }

        summary.finished_at = Some(Utc::now());
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            "Vector refresh complete"
        );

        Ok(summary)
    }
}

/// Profile for one text source; transport failures fail the book
fn source_profile(source_kind: &'static str, outcome: AnalysisOutcome) -> Result<EmotionProfile, ProfileError> {
    match outcome {
        AnalysisOutcome::ServiceFailed(message) => Err(ProfileError::Analysis {
            source_kind,
            message,
        }),
        other => {
            if other.is_error() {
                warn!(source_kind, "Unparseable analysis, using neutral profile");
            }
            Ok(other.into_profile())
        }
    }
}
