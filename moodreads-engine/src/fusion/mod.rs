// Fusion Module - Emotion Signal Fusion
//
// Genre baseline (0.0-1.0) plus text-derived profiles (0-10) → one composite
// profile on the 0-10 scale.

pub mod genre_mapping;
pub mod profile_fuser;

pub use genre_mapping::genres_to_emotions;
pub use profile_fuser::{fuse, fuse_with_weights, FusionWeights};
