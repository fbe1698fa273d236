// Genre → Baseline Emotion Mapping
//
// Low-weight supplementary signal. Intensities here are on the 0.0-1.0 scale;
// fusion rescales them before combining with text-derived profiles.

use std::collections::HashMap;

/// Intensity multiplier applied when a genre only matches by substring
pub const PARTIAL_MATCH_FACTOR: f64 = 0.8;

/// Genre labels with a table entry, in table order
pub const KNOWN_GENRES: [&str; 16] = [
    "horror",
    "romance",
    "thriller",
    "mystery",
    "fantasy",
    "science fiction",
    "literary fiction",
    "historical fiction",
    "young adult",
    "biography",
    "self-help",
    "comedy",
    "drama",
    "adventure",
    "poetry",
    "classic",
];

/// Helper macro for creating hashmaps
macro_rules! hashmap {
    ($($key:expr => $val:expr),* $(,)?) => {{
        let mut map = HashMap::new();
        $(map.insert($key.to_string(), $val);)*
        map
    }};
}

/// Baseline emotions for one table genre
///
/// # Arguments
/// * `genre` - Genre label (case-insensitive, exact)
///
/// # Returns
/// * HashMap of emotion name → intensity (0.0-1.0)
/// * Empty HashMap if genre not in the table
pub fn table_emotions(genre: &str) -> HashMap<String, f64> {
    let genre_lower = genre.trim().to_lowercase();

    match genre_lower.as_str() {
        "horror" => hashmap! {
            "fear" => 0.8,
            "tension" => 0.7,
            "dread" => 0.6,
        },

        "romance" => hashmap! {
            "joy" => 0.7,
            "comfort" => 0.6,
            "hope" => 0.5,
        },

        "thriller" => hashmap! {
            "tension" => 0.8,
            "curiosity" => 0.7,
            "excitement" => 0.6,
        },

        "mystery" => hashmap! {
            "curiosity" => 0.8,
            "tension" => 0.6,
            "satisfaction" => 0.5,
        },

        "fantasy" => hashmap! {
            "wonder" => 0.8,
            "curiosity" => 0.6,
            "inspiration" => 0.5,
        },

        "science fiction" => hashmap! {
            "wonder" => 0.7,
            "curiosity" => 0.7,
            "tension" => 0.4,
        },

        "literary fiction" => hashmap! {
            "reflection" => 0.7,
            "melancholy" => 0.5,
            "satisfaction" => 0.6,
        },

        "historical fiction" => hashmap! {
            "reflection" => 0.6,
            "curiosity" => 0.5,
            "satisfaction" => 0.5,
        },

        "young adult" => hashmap! {
            "excitement" => 0.6,
            "hope" => 0.5,
            "curiosity" => 0.5,
        },

        "biography" => hashmap! {
            "reflection" => 0.7,
            "inspiration" => 0.6,
            "satisfaction" => 0.5,
        },

        "self-help" => hashmap! {
            "hope" => 0.8,
            "inspiration" => 0.7,
            "comfort" => 0.5,
        },

        "comedy" => hashmap! {
            "joy" => 0.8,
            "comfort" => 0.6,
            "satisfaction" => 0.5,
        },

        "drama" => hashmap! {
            "tension" => 0.7,
            "reflection" => 0.6,
            "melancholy" => 0.5,
        },

        "adventure" => hashmap! {
            "excitement" => 0.8,
            "curiosity" => 0.6,
            "wonder" => 0.5,
        },

        "poetry" => hashmap! {
            "reflection" => 0.7,
            "melancholy" => 0.5,
            "wonder" => 0.6,
        },

        "classic" => hashmap! {
            "reflection" => 0.7,
            "satisfaction" => 0.6,
            "melancholy" => 0.5,
        },

        _ => HashMap::new(),
    }
}

/// Map genre labels to baseline emotion intensities
///
/// Exact matches use the table values. A label without an exact match is
/// compared by substring (either direction) against every table genre and
/// each hit contributes its values scaled by `PARTIAL_MATCH_FACTOR`. An
/// emotion reachable through several genres keeps its maximum.
///
/// # Returns
/// * HashMap of emotion name → intensity (0.0-1.0); empty for no matches
pub fn genres_to_emotions<S: AsRef<str>>(genres: &[S]) -> HashMap<String, f64> {
    let mut emotions: HashMap<String, f64> = HashMap::new();

    for genre in genres {
        let genre_lower = genre.as_ref().trim().to_lowercase();
        if genre_lower.is_empty() {
            continue;
        }

        let exact = table_emotions(&genre_lower);
        if !exact.is_empty() {
            merge_max(&mut emotions, exact, 1.0);
            continue;
        }

        for known in KNOWN_GENRES {
            if genre_lower.contains(known) || known.contains(genre_lower.as_str()) {
                merge_max(&mut emotions, table_emotions(known), PARTIAL_MATCH_FACTOR);
            }
        }
    }

    emotions
}

fn merge_max(into: &mut HashMap<String, f64>, from: HashMap<String, f64>, factor: f64) {
    for (emotion, intensity) in from {
        let scaled = intensity * factor;
        let entry = into.entry(emotion).or_insert(scaled);
        if scaled > *entry {
            *entry = scaled;
        }
    }
}
