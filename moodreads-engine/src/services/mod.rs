//! Service modules for emotion analysis
//!
//! - Text-analysis service client (rate limited)
//! - Content-addressed analysis cache
//! - Emotion extractor (prompting, parsing, write-through caching)

pub mod analysis_service;
pub mod emotion_cache;
pub mod emotion_extractor;

pub use analysis_service::{AnalysisRequest, AnthropicClient, LlmError, RateLimiter, TextAnalysisService};
pub use emotion_cache::{cache_key, CacheKind, CacheStore, EmotionCache, JsonFileCacheStore, MemoryCacheStore};
pub use emotion_extractor::{
    parse_response, AnalysisContext, AnalysisOutcome, EmotionExtractor, PROMPT_TEMPLATE_VERSION,
};
