//! Similarity search over stored book vectors

pub mod similarity_index;

pub use similarity_index::{
    cosine_similarity, effective_limit, rank, search, select_tiered, MatchTier, ScoredCandidate,
    SimilarityIndex, VectorCandidate,
};
