//! Canonical emotion axes
//!
//! Order is part of the vector contract. Any change to the list or its order
//! must bump `AXIS_VERSION` so stored vectors are regenerated.

pub const AXIS_VERSION: &str = "v1";

pub const AXIS_COUNT: usize = 30;

pub const CANONICAL_AXES: [&str; AXIS_COUNT] = [
    "joy",
    "sadness",
    "anger",
    "fear",
    "surprise",
    "disgust",
    "anticipation",
    "trust",
    "wonder",
    "excitement",
    "reflection",
    "tension",
    "comfort",
    "outrage",
    "melancholy",
    "nostalgia",
    "hope",
    "despair",
    "curiosity",
    "confusion",
    "awe",
    "love",
    "hate",
    "anxiety",
    "relief",
    "pride",
    "shame",
    "courage",
    "oppression",
    "liberation",
];

/// Index of an exact (already lowercased) axis name
pub fn axis_index(name: &str) -> Option<usize> {
    CANONICAL_AXES.iter().position(|axis| *axis == name)
}

pub fn axis_name(index: usize) -> Option<&'static str> {
    CANONICAL_AXES.get(index).copied()
}
