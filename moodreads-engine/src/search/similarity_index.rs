//! Exhaustive cosine-similarity search
//!
//! Linear scan over every candidate that carries a vector; no index is
//! maintained between calls. Ranking is by descending score with ties kept
//! in input order.
//!
//! **Tiered selection** (applied after ranking):
//! - Tier A: score > 0.03
//! - Tier B: 0.001 < score <= 0.03
//! - Tier C: score <= 0.001
//!
//! The best non-empty tier wins. If only Tier C exists the top `limit`
//! candidates are returned regardless of score.

use crate::models::{BookRecord, EmotionVector};

pub const GOOD_MATCH_THRESHOLD: f64 = 0.03;
pub const WEAK_MATCH_THRESHOLD: f64 = 0.001;

/// Anything that can be ranked against a query vector
pub trait VectorCandidate {
    fn emotion_vector(&self) -> Option<&EmotionVector>;

    fn title(&self) -> &str;
}

impl VectorCandidate for BookRecord {
    fn emotion_vector(&self) -> Option<&EmotionVector> {
        self.emotion_vector.as_ref()
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// Candidate paired with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<T> {
    pub candidate: T,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Good,
    Weak,
    Fallback,
}

impl MatchTier {
    pub fn of(score: f64) -> Self {
        if score > GOOD_MATCH_THRESHOLD {
            MatchTier::Good
        } else if score > WEAK_MATCH_THRESHOLD {
            MatchTier::Weak
        } else {
            MatchTier::Fallback
        }
    }
}

/// Cosine similarity; 0 for zero or incomparable vectors
pub fn cosine_similarity(a: &EmotionVector, b: &EmotionVector) -> f64 {
    if !a.is_comparable(b) || a.is_zero() || b.is_zero() {
        return 0.0;
    }

    let dot: f64 = a.values.iter().zip(&b.values).map(|(x, y)| x * y).sum();
    let denominator = a.norm() * b.norm();
    if denominator == 0.0 {
        return 0.0;
    }

    let similarity = dot / denominator;
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

/// Score every candidate that has a vector, best first
pub fn rank<'a, T: VectorCandidate>(query: &EmotionVector, candidates: &'a [T]) -> Vec<ScoredCandidate<&'a T>> {
    let mut scored: Vec<ScoredCandidate<&'a T>> = candidates
        .iter()
        .filter_map(|candidate| {
            candidate.emotion_vector().map(|vector| ScoredCandidate {
                candidate,
                score: cosine_similarity(query, vector),
            })
        })
        .collect();

    // sort_by is stable: equal scores keep input order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Top `limit` candidates by raw score
pub fn search<'a, T: VectorCandidate>(
    query: &EmotionVector,
    candidates: &'a [T],
    limit: usize,
) -> Vec<ScoredCandidate<&'a T>> {
    let mut ranked = rank(query, candidates);
    ranked.truncate(limit);
    ranked
}

/// Best non-empty tier of an already ranked list, capped at `limit`
pub fn select_tiered<T>(ranked: Vec<ScoredCandidate<T>>, limit: usize) -> Vec<ScoredCandidate<T>> {
    if ranked.is_empty() || limit == 0 {
        return Vec::new();
    }

    let best_tier = if ranked.iter().any(|s| MatchTier::of(s.score) == MatchTier::Good) {
        MatchTier::Good
    } else if ranked.iter().any(|s| MatchTier::of(s.score) == MatchTier::Weak) {
        MatchTier::Weak
    } else {
        MatchTier::Fallback
    };

    ranked
        .into_iter()
        .filter(|s| best_tier == MatchTier::Fallback || MatchTier::of(s.score) == best_tier)
        .take(limit)
        .collect()
}

/// Requested limit, defaulted and clamped to `[1, max_limit]`
pub fn effective_limit(requested: Option<usize>, default_limit: usize, max_limit: usize) -> usize {
    let max_limit = max_limit.max(1);
    requested.unwrap_or(default_limit).clamp(1, max_limit)
}

/// Stateless search front end with the configured limits
#[derive(Debug, Clone, Copy)]
pub struct SimilarityIndex {
    default_limit: usize,
    max_limit: usize,
}

impl Default for SimilarityIndex {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: 10,
        }
    }
}

impl SimilarityIndex {
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    pub fn limit_for(&self, requested: Option<usize>) -> usize {
        effective_limit(requested, self.default_limit, self.max_limit)
    }

    /// Drop placeholder titles, rank, then apply tiered selection
    pub fn select<'a, T: VectorCandidate>(
        &self,
        query: &EmotionVector,
        candidates: &'a [T],
        requested_limit: Option<usize>,
    ) -> Vec<ScoredCandidate<&'a T>> {
        let limit = self.limit_for(requested_limit);
        let ranked: Vec<ScoredCandidate<&'a T>> = rank(query, candidates)
            .into_iter()
            .filter(|s| crate::models::is_real_title(s.candidate.title()))
            .collect();
        select_tiered(ranked, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(values: &[f64]) -> EmotionVector {
        EmotionVector::normalized("v1", values.to_vec())
    }

    fn scored(scores: &[f64]) -> Vec<ScoredCandidate<usize>> {
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| ScoredCandidate { candidate: i, score: *score })
            .collect()
    }

    fn scores_of(selected: &[ScoredCandidate<usize>]) -> Vec<f64> {
        selected.iter().map(|s| s.score).collect()
    }

    struct Candidate {
        title: &'static str,
        vector: Option<EmotionVector>,
    }

    impl VectorCandidate for Candidate {
        fn emotion_vector(&self) -> Option<&EmotionVector> {
            self.vector.as_ref()
        }

        fn title(&self) -> &str {
            self.title
        }
    }

    #[test]
    fn test_cosine_known_values() {
        let x = vector(&[1.0, 0.0]);
        let y = vector(&[0.0, 1.0]);
        let diagonal = vector(&[1.0, 1.0]);

        assert_eq!(cosine_similarity(&x, &y), 0.0);
        assert!((cosine_similarity(&x, &x) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&x, &diagonal) - 0.7071).abs() < 1e-4);
    }

    #[test]
    fn test_cosine_zero_and_incomparable() {
        let x = vector(&[1.0, 0.0]);
        let zero = EmotionVector::zeros("v1", 2);
        let other_version = EmotionVector::normalized("v2", vec![1.0, 0.0]);

        assert_eq!(cosine_similarity(&x, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
        assert_eq!(cosine_similarity(&x, &other_version), 0.0);
    }

    #[test]
    fn test_tier_a_excludes_lower_tiers() {
        let selected = select_tiered(scored(&[0.05, 0.02, 0.0005]), 5);
        assert_eq!(scores_of(&selected), vec![0.05]);
    }

    #[test]
    fn test_tier_b_when_no_good_match() {
        let selected = select_tiered(scored(&[0.02, 0.01]), 5);
        assert_eq!(scores_of(&selected), vec![0.02, 0.01]);
    }

    #[test]
    fn test_tier_c_fallback_returns_top_limit() {
        let selected = select_tiered(scored(&[0.0001, 0.0]), 5);
        assert_eq!(scores_of(&selected), vec![0.0001, 0.0]);

        let capped = select_tiered(scored(&[0.0, 0.0, 0.0]), 2);
        assert_eq!(capped.len(), 2);
        assert!(select_tiered(scored(&[]), 5).is_empty());
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(MatchTier::of(0.03), MatchTier::Weak);
        assert_eq!(MatchTier::of(0.0301), MatchTier::Good);
        assert_eq!(MatchTier::of(0.001), MatchTier::Fallback);
    }

    #[test]
    fn test_rank_is_stable_and_skips_missing_vectors() {
        let v = vector(&[1.0, 0.0]);
        let candidates = vec![
            Candidate { title: "First", vector: Some(v.clone()) },
            Candidate { title: "No vector", vector: None },
            Candidate { title: "Second", vector: Some(v.clone()) },
        ];
        let ranked = rank(&v, &candidates);
        let titles: Vec<&str> = ranked.iter().map(|s| s.candidate.title).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(search(&v, &candidates, 1).len(), 1);
    }

    #[test]
    fn test_placeholder_titles_never_selected() {
        let query = vector(&[1.0, 0.0]);
        let candidates = vec![
            Candidate { title: "Unknown Title", vector: Some(vector(&[1.0, 0.0])) },
            Candidate { title: "", vector: Some(vector(&[1.0, 0.0])) },
            Candidate { title: "Real Book", vector: Some(vector(&[1.0, 1.0])) },
        ];

        let selected = SimilarityIndex::default().select(&query, &candidates, None);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].candidate.title, "Real Book");
    }

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(None, 5, 10), 5);
        assert_eq!(effective_limit(Some(3), 5, 10), 3);
        assert_eq!(effective_limit(Some(50), 5, 10), 10);
        assert_eq!(effective_limit(Some(0), 5, 10), 1);
    }
}
