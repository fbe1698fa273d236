// Profile Fuser - Source-Availability-Aware Weighted Averaging
//
// Combines the description profile, the reviews profile and the genre baseline
// into one composite profile. Each emotion is a weighted average over only the
// sources that mention it, so a source staying silent never discounts it.

use crate::models::{dedup_max, ArcStage, EmotionIntensity, EmotionProfile, EmotionalArc, PROFILE_SCALE_MAX};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Per-source weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub description: f64,
    pub reviews: f64,
    pub genre: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            description: 0.4,
            reviews: 0.5,
            genre: 0.1,
        }
    }
}

/// Fuse three emotion sources into one profile with default weights
///
/// # Arguments
/// * `description` - Profile from the book description (0-10 scale)
/// * `reviews` - Profile from reader reviews (0-10 scale)
/// * `genre_emotions` - Genre baseline (0.0-1.0 scale)
///
/// # Returns
/// * Composite profile, primary emotions sorted by descending intensity
pub fn fuse(
    description: &EmotionProfile,
    reviews: &EmotionProfile,
    genre_emotions: &HashMap<String, f64>,
) -> EmotionProfile {
    fuse_with_weights(description, reviews, genre_emotions, FusionWeights::default())
}

pub fn fuse_with_weights(
    description: &EmotionProfile,
    reviews: &EmotionProfile,
    genre_emotions: &HashMap<String, f64>,
    weights: FusionWeights,
) -> EmotionProfile {
    EmotionProfile {
        primary_emotions: fuse_primary_emotions(description, reviews, genre_emotions, weights),
        emotional_arc: merge_arcs(&reviews.emotional_arc, &description.emotional_arc),
        unexpected_emotions: union(&description.unexpected_emotions, &reviews.unexpected_emotions),
        lasting_impact: prefer_reviews(&reviews.lasting_impact, &description.lasting_impact),
        emotional_keywords: union(&description.emotional_keywords, &reviews.emotional_keywords),
        overall_summary: prefer_reviews(&reviews.overall_summary, &description.overall_summary),
    }
}

fn fuse_primary_emotions(
    description: &EmotionProfile,
    reviews: &EmotionProfile,
    genre_emotions: &HashMap<String, f64>,
    weights: FusionWeights,
) -> Vec<EmotionIntensity> {
    // Collect (value, weight) pairs per emotion, skipping silent sources
    let mut emotion_values: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();

    for entry in description.deduplicated_emotions() {
        if entry.intensity > 0.0 {
            emotion_values
                .entry(entry.emotion)
                .or_default()
                .push((entry.intensity, weights.description));
        }
    }

    for entry in reviews.deduplicated_emotions() {
        if entry.intensity > 0.0 {
            emotion_values
                .entry(entry.emotion)
                .or_default()
                .push((entry.intensity, weights.reviews));
        }
    }

    let genre_entries: Vec<EmotionIntensity> = genre_emotions
        .iter()
        .map(|(emotion, intensity)| EmotionIntensity::new(emotion.clone(), intensity * PROFILE_SCALE_MAX))
        .collect();
    for entry in dedup_max(&genre_entries) {
        if entry.intensity > 0.0 {
            emotion_values
                .entry(entry.emotion)
                .or_default()
                .push((entry.intensity.min(PROFILE_SCALE_MAX), weights.genre));
        }
    }

    let mut fused: Vec<EmotionIntensity> = emotion_values
        .into_iter()
        .filter_map(|(emotion, values)| {
            weighted_average(&values).map(|avg| EmotionIntensity::new(emotion, round_one_decimal(avg)))
        })
        .collect();

    // Stable: equal intensities stay in name order
    fused.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
    fused
}

/// Weighted average over `(value, weight)` pairs; `None` if no weight
fn weighted_average(values: &[(f64, f64)]) -> Option<f64> {
    let sum_weighted: f64 = values.iter().map(|(val, weight)| val * weight).sum();
    let sum_weights: f64 = values.iter().map(|(_, weight)| weight).sum();

    if sum_weights > 0.0 {
        Some(sum_weighted / sum_weights)
    } else {
        None
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Primary arc first, then secondary names not already present, per stage
fn merge_arcs(primary: &EmotionalArc, secondary: &EmotionalArc) -> EmotionalArc {
    let mut merged = EmotionalArc::default();
    for stage in ArcStage::ALL {
        *merged.stage_mut(stage) = union(primary.stage(stage), secondary.stage(stage));
    }
    merged
}

/// Case-insensitive union preserving first-seen order
fn union(first: &[String], second: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    first
        .iter()
        .chain(second.iter())
        .filter(|item| seen.insert(item.trim().to_lowercase()))
        .cloned()
        .collect()
}

fn prefer_reviews(reviews: &str, description: &str) -> String {
    if !reviews.trim().is_empty() {
        reviews.to_string()
    } else {
        description.to_string()
    }
}
