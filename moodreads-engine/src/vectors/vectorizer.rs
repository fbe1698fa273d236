//! Emotion vectorizer
//!
//! Converts any profile shape into a unit-normalized vector over the
//! canonical axes. Every input variant is first adapted to one flat list of
//! `(emotion name, intensity in 0.0-1.0)` pairs; resolution, max-merging and
//! normalization are shared from there.

use super::axes::{AXIS_COUNT, AXIS_VERSION};
use super::resolver::{EmotionResolver, Resolution};
use crate::models::profile::emotion_entries;
use crate::models::{EmotionIntensity, EmotionProfile, EmotionVector, UserQueryProfile, PROFILE_SCALE_MAX};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Scale of a raw emotion list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityScale {
    /// 0.0-1.0
    Unit,
    /// 0-10
    Ten,
}

/// Every profile shape the vectorizer accepts
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileInput {
    Description(EmotionProfile),
    Review(EmotionProfile),
    Fused(EmotionProfile),
    RawEmotionList {
        entries: Vec<EmotionIntensity>,
        scale: IntensityScale,
    },
    UserQuery(UserQueryProfile),
}

impl ProfileInput {
    /// Pick the variant by inspecting the JSON structure
    ///
    /// Arrays are raw lists on the 0-10 scale. Anything unrecognized becomes
    /// an empty raw list and vectorizes to the zero vector.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(_) => ProfileInput::RawEmotionList {
                entries: emotion_entries(value),
                scale: IntensityScale::Ten,
            },
            Value::Object(map) if map.contains_key("primary_emotions") => {
                ProfileInput::Fused(EmotionProfile::from_value(value))
            }
            Value::Object(map)
                if map.contains_key("desired_emotional_experience")
                    || map.contains_key("emotional_journey") =>
            {
                ProfileInput::UserQuery(UserQueryProfile::from_value(value))
            }
            _ => ProfileInput::RawEmotionList {
                entries: Vec::new(),
                scale: IntensityScale::Unit,
            },
        }
    }

    /// Flat `(name, intensity 0.0-1.0)` list
    fn unit_entries(&self) -> Vec<(String, f64)> {
        let (entries, divisor) = match self {
            ProfileInput::Description(profile)
            | ProfileInput::Review(profile)
            | ProfileInput::Fused(profile) => (profile.primary_emotions.clone(), PROFILE_SCALE_MAX),
            ProfileInput::RawEmotionList { entries, scale } => {
                let divisor = match scale {
                    IntensityScale::Unit => 1.0,
                    IntensityScale::Ten => PROFILE_SCALE_MAX,
                };
                (entries.clone(), divisor)
            }
            ProfileInput::UserQuery(query) => (query.desired_entries(), PROFILE_SCALE_MAX),
        };

        entries
            .into_iter()
            .filter(|e| e.intensity.is_finite())
            .map(|e| (e.emotion, (e.intensity / divisor).clamp(0.0, 1.0)))
            .collect()
    }
}

/// Profile → `EmotionVector` over the canonical axes
pub struct EmotionVectorizer {
    resolver: Arc<dyn EmotionResolver>,
}

impl EmotionVectorizer {
    pub fn new(resolver: Arc<dyn EmotionResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<dyn EmotionResolver> {
        &self.resolver
    }

    /// Vectorize one input
    ///
    /// # Returns
    /// * Zero vector, or a vector of Euclidean norm 1
    pub async fn vectorize(&self, input: &ProfileInput) -> EmotionVector {
        let mut values = vec![0.0; AXIS_COUNT];

        for (name, intensity) in input.unit_entries() {
            match self.resolver.resolve(&name).await {
                Resolution::Axis(index) if index < AXIS_COUNT => {
                    if intensity > values[index] {
                        values[index] = intensity;
                    }
                }
                _ => {
                    debug!(emotion = %name, "Emotion carries no axis signal");
                }
            }
        }

        EmotionVector::normalized(AXIS_VERSION, values)
    }

    pub async fn vectorize_profile(&self, profile: &EmotionProfile) -> EmotionVector {
        self.vectorize(&ProfileInput::Fused(profile.clone())).await
    }

    pub async fn vectorize_value(&self, value: &Value) -> EmotionVector {
        self.vectorize(&ProfileInput::from_value(value)).await
    }
}

/// Weighted sum of same-version vectors, renormalized
///
/// Weights default to equal and are normalized to sum 1. Vectors built
/// against another axis version are skipped.
pub fn composite_vector(vectors: &[EmotionVector], weights: Option<&[f64]>) -> EmotionVector {
    let equal;
    let weights = match weights {
        Some(w) if w.len() == vectors.len() => w,
        _ => {
            equal = vec![1.0; vectors.len()];
            equal.as_slice()
        }
    };

    let total: f64 = vectors
        .iter()
        .zip(weights)
        .filter(|(v, _)| v.axis_version == AXIS_VERSION && v.dimensions() == AXIS_COUNT)
        .map(|(_, w)| *w)
        .sum();

    let mut values = vec![0.0; AXIS_COUNT];
    if total > 0.0 {
        for (vector, weight) in vectors.iter().zip(weights) {
            if vector.axis_version != AXIS_VERSION || vector.dimensions() != AXIS_COUNT {
                continue;
            }
            for (slot, value) in values.iter_mut().zip(&vector.values) {
                *slot += value * (weight / total);
            }
        }
    }

    EmotionVector::normalized(AXIS_VERSION, values)
}
