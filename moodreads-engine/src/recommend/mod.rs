//! Mood query → ranked, explained recommendations

pub mod explanation;
pub mod orchestrator;

pub use explanation::{build_explanation, shared_arc_stages, shared_keywords};
pub use orchestrator::RecommendationOrchestrator;
