//! Emotion vectors over a versioned canonical axis list
//!
//! - Canonical axes and their version tag
//! - Name → axis resolution (local cascade, pluggable fallback)
//! - Profile → unit vector conversion

pub mod axes;
pub mod resolver;
pub mod vectorizer;

pub use axes::{axis_index, axis_name, AXIS_COUNT, AXIS_VERSION, CANONICAL_AXES};
pub use resolver::{CascadingResolver, EmotionResolver, LocalResolver, Resolution, ServiceResolver};
pub use vectorizer::{composite_vector, EmotionVectorizer, IntensityScale, ProfileInput};
