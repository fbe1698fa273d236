//! Human-readable match explanations

use crate::models::{ArcStage, BookRecord, EmotionIntensity, EmotionProfile, EmotionalArc};
use std::collections::HashSet;

/// Keywords present in both lists, compared case-insensitively
///
/// Returned in candidate order with candidate spelling.
pub fn shared_keywords(query: &[String], candidate: &[String]) -> Vec<String> {
    let wanted: HashSet<String> = query.iter().map(|k| k.trim().to_lowercase()).collect();
    let mut seen = HashSet::new();
    candidate
        .iter()
        .filter(|k| {
            let key = k.trim().to_lowercase();
            wanted.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect()
}

/// Arc stages where query and candidate share at least one emotion
pub fn shared_arc_stages(query: &EmotionalArc, candidate: &EmotionalArc) -> Vec<(ArcStage, Vec<String>)> {
    ArcStage::ALL
        .into_iter()
        .filter_map(|stage| {
            let shared = shared_keywords(query.stage(stage), candidate.stage(stage));
            if shared.is_empty() {
                None
            } else {
                Some((stage, shared))
            }
        })
        .collect()
}

/// Multi-line explanation for one recommended book
///
/// # Arguments
/// * `book` - Candidate record
/// * `candidate_profile` - Candidate's fused profile
/// * `query_profile` - Profile derived from the mood text
/// * `matched` - Candidate emotions sharing an axis with the query
pub fn build_explanation(
    book: &BookRecord,
    candidate_profile: &EmotionProfile,
    query_profile: &EmotionProfile,
    matched: &[EmotionIntensity],
) -> String {
    let mut lines = vec![format!("\"{}\" by {}", book.title.trim(), book.author.trim())];

    if !matched.is_empty() {
        let emotions: Vec<String> = matched
            .iter()
            .map(|e| format!("{} ({:.1}/10)", e.emotion, e.intensity))
            .collect();
        lines.push(format!("Shared emotions: {}", emotions.join(", ")));
    }

    let keywords = shared_keywords(
        &query_profile.emotional_keywords,
        &candidate_profile.emotional_keywords,
    );
    if !keywords.is_empty() {
        lines.push(format!("Shared keywords: {}", keywords.join(", ")));
    }

    let stages = shared_arc_stages(&query_profile.emotional_arc, &candidate_profile.emotional_arc);
    if !stages.is_empty() {
        let parts: Vec<String> = stages
            .iter()
            .map(|(stage, names)| format!("{} ({})", stage.as_str(), names.join(", ")))
            .collect();
        lines.push(format!("Emotional journey: {}", parts.join("; ")));
    }

    if matched.is_empty() && keywords.is_empty() && stages.is_empty() {
        lines.push("Closest available match for your mood.".to_string());
    }

    let summary = candidate_profile.overall_summary.trim();
    if !summary.is_empty() {
        lines.push(summary.to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shared_keywords_case_insensitive() {
        let shared = shared_keywords(&strings(&["Quiet", "gentle"]), &strings(&["quiet", "stormy", "QUIET"]));
        assert_eq!(shared, strings(&["quiet"]));
    }

    #[test]
    fn test_shared_arc_stages() {
        let query = EmotionalArc {
            beginning: strings(&["sadness"]),
            middle: vec![],
            end: strings(&["hope"]),
        };
        let candidate = EmotionalArc {
            beginning: strings(&["curiosity"]),
            middle: strings(&["hope"]),
            end: strings(&["Hope", "relief"]),
        };
        let stages = shared_arc_stages(&query, &candidate);
        assert_eq!(stages, vec![(ArcStage::End, strings(&["Hope"]))]);
    }

    #[test]
    fn test_explanation_lists_matches_and_summary() {
        let book = BookRecord::new("Gilead", "Marilynne Robinson");
        let candidate = EmotionProfile {
            emotional_keywords: strings(&["quiet", "grace"]),
            overall_summary: "A calm meditation on faith.".to_string(),
            ..Default::default()
        };
        let query = EmotionProfile {
            emotional_keywords: strings(&["Quiet"]),
            ..Default::default()
        };
        let matched = vec![EmotionIntensity::new("calm", 7.0)];

        let text = build_explanation(&book, &candidate, &query, &matched);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "\"Gilead\" by Marilynne Robinson");
        assert_eq!(lines[1], "Shared emotions: calm (7.0/10)");
        assert_eq!(lines[2], "Shared keywords: quiet");
        assert_eq!(lines[3], "A calm meditation on faith.");
    }

    #[test]
    fn test_explanation_without_shared_signal() {
        let book = BookRecord::new("Dune", "Frank Herbert");
        let text = build_explanation(&book, &EmotionProfile::default(), &EmotionProfile::default(), &[]);
        assert!(text.contains("Closest available match"));
    }
}
