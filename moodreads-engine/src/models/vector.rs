//! Emotion vector
//!
//! Dense array over a versioned canonical axis list. Either the zero vector
//! or unit length. Two vectors are only comparable when built against the
//! same axis version.

use serde::{Deserialize, Serialize};

/// Tolerance used when checking the unit-length invariant
pub const NORM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector {
    /// Axis list version the values are indexed by
    pub axis_version: String,
    pub values: Vec<f64>,
}

impl EmotionVector {
    /// Build from raw values, normalizing to unit length
    ///
    /// An all-zero input stays the zero vector.
    pub fn normalized(axis_version: impl Into<String>, mut values: Vec<f64>) -> Self {
        let norm = euclidean_norm(&values);
        if norm > 0.0 {
            for value in values.iter_mut() {
                *value /= norm;
            }
        }
        Self {
            axis_version: axis_version.into(),
            values,
        }
    }

    pub fn zeros(axis_version: impl Into<String>, dimensions: usize) -> Self {
        Self {
            axis_version: axis_version.into(),
            values: vec![0.0; dimensions],
        }
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    pub fn norm(&self) -> f64 {
        euclidean_norm(&self.values)
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Whether this vector can be compared with `other`
    pub fn is_comparable(&self, other: &EmotionVector) -> bool {
        self.axis_version == other.axis_version && self.values.len() == other.values.len()
    }
}

pub(crate) fn euclidean_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_unit_length() {
        let vector = EmotionVector::normalized("v1", vec![3.0, 4.0, 0.0, 0.0]);
        assert!((vector.norm() - 1.0).abs() < NORM_TOLERANCE);
        assert!((vector.values[0] - 0.6).abs() < 1e-12);
        assert!((vector.values[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_stays_zero() {
        let vector = EmotionVector::normalized("v1", vec![0.0; 4]);
        assert!(vector.is_zero());
        assert_eq!(vector.norm(), 0.0);
        assert!(vector.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_comparability_requires_same_version() {
        let a = EmotionVector::zeros("v1", 3);
        let b = EmotionVector::zeros("v2", 3);
        let c = EmotionVector::zeros("v1", 4);
        assert!(a.is_comparable(&a.clone()));
        assert!(!a.is_comparable(&b));
        assert!(!a.is_comparable(&c));
    }
}
