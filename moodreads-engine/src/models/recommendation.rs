//! Recommendation output consumed by UI/API collaborators

use super::{EmotionIntensity, EmotionalArc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    /// Similarity as an integer percentage (0-100)
    pub match_score: u8,
    pub matching_emotions: Vec<EmotionIntensity>,
    pub emotional_arc: EmotionalArc,
    pub explanation: String,
    pub source_url: String,
}

/// Convert a cosine score into a 0-100 percentage
pub fn match_score_percent(score: f64) -> u8 {
    if !score.is_finite() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_score_percent() {
        assert_eq!(match_score_percent(0.0), 0);
        assert_eq!(match_score_percent(0.834), 83);
        assert_eq!(match_score_percent(1.0), 100);
        assert_eq!(match_score_percent(1.3), 100);
        assert_eq!(match_score_percent(-0.4), 0);
        assert_eq!(match_score_percent(f64::NAN), 0);
    }
}
