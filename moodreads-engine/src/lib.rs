//! moodreads-engine library interface
//!
//! Emotion-signal fusion and vector-similarity book recommendation:
//! extraction → fusion → vectorization → search → explanation.
//!
//! `Engine` wires the components together; each component is also usable
//! on its own for testing.

pub mod config;
pub mod db;
pub mod fusion;
pub mod models;
pub mod recommend;
pub mod search;
pub mod services;
pub mod vectors;
pub mod workflow;

use crate::config::EngineConfig;
use crate::db::{BookStore, SqliteBookStore};
use crate::recommend::RecommendationOrchestrator;
use crate::search::SimilarityIndex;
use crate::services::{AnthropicClient, EmotionCache, EmotionExtractor, TextAnalysisService};
use crate::vectors::{CascadingResolver, EmotionVectorizer, ServiceResolver};
use crate::workflow::BookProfiler;
use moodreads_common::{Error, Result};
use std::sync::Arc;

/// Fully wired engine components
pub struct Engine {
    pub store: Arc<dyn BookStore>,
    pub extractor: Arc<EmotionExtractor>,
    pub vectorizer: Arc<EmotionVectorizer>,
    pub orchestrator: RecommendationOrchestrator,
    pub profiler: BookProfiler,
}

impl Engine {
    /// Wire components around an analysis service, cache and store
    ///
    /// Emotion names the local tables cannot resolve are sent to the
    /// analysis service.
    pub fn new(
        service: Arc<dyn TextAnalysisService>,
        cache: Arc<EmotionCache>,
        store: Arc<dyn BookStore>,
        config: &EngineConfig,
    ) -> Self {
        let extractor = Arc::new(
            EmotionExtractor::new(service, cache)
                .with_limits(config.analysis.max_tokens, config.analysis.temperature),
        );
        let resolver = CascadingResolver::with_fallback(Arc::new(ServiceResolver::new(extractor.clone())));
        let vectorizer = Arc::new(EmotionVectorizer::new(Arc::new(resolver)));

        let orchestrator = RecommendationOrchestrator::new(
            extractor.clone(),
            vectorizer.clone(),
            store.clone(),
            SimilarityIndex::new(config.default_limit, config.max_limit),
        );
        let profiler = BookProfiler::new(
            extractor.clone(),
            vectorizer.clone(),
            store.clone(),
            config.item_timeout,
        );

        Self {
            store,
            extractor,
            vectorizer,
            orchestrator,
            profiler,
        }
    }

    /// Open the on-disk store and cache and connect the analysis client
    pub async fn open(config: &EngineConfig, api_key: String) -> Result<Self> {
        std::fs::create_dir_all(&config.root_folder)?;

        let pool = db::init_database_pool(&config.database_path()).await?;
        let store: Arc<dyn BookStore> = Arc::new(SqliteBookStore::new(pool));
        let cache = Arc::new(EmotionCache::open_file(config.cache_path())?);
        let client = AnthropicClient::new(&config.analysis, api_key)
            .map_err(|e| Error::Config(format!("Failed to create analysis client: {}", e)))?;

        tracing::info!(
            root_folder = %config.root_folder.display(),
            model = client.model(),
            "Engine opened"
        );

        Ok(Self::new(Arc::new(client), cache, store, config))
    }
}
