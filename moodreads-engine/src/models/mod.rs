//! Data models for the recommendation engine
//!
//! - Emotion profiles (book analysis and mood queries)
//! - Emotion vectors
//! - Book records and recommendation output

pub mod book;
pub mod profile;
pub mod recommendation;
pub mod vector;

pub use book::{is_real_title, BookRecord};
pub use profile::{
    dedup_max, ArcStage, EmotionIntensity, EmotionProfile, EmotionalArc, UserQueryProfile,
    PROFILE_SCALE_MAX,
};
pub use recommendation::{match_score_percent, Recommendation};
pub use vector::{EmotionVector, NORM_TOLERANCE};
