//! Emotion profile data model
//!
//! Intensities on `EmotionProfile` are always on the 0-10 scale. Every field
//! may be empty; absence means "no signal".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Upper bound of the profile intensity scale
pub const PROFILE_SCALE_MAX: f64 = 10.0;

/// One emotion with its intensity (0-10)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionIntensity {
    pub emotion: String,
    pub intensity: f64,
}

impl EmotionIntensity {
    pub fn new(emotion: impl Into<String>, intensity: f64) -> Self {
        Self {
            emotion: emotion.into(),
            intensity,
        }
    }
}

/// Stage of an emotional arc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcStage {
    Beginning,
    Middle,
    End,
}

impl ArcStage {
    pub const ALL: [ArcStage; 3] = [ArcStage::Beginning, ArcStage::Middle, ArcStage::End];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArcStage::Beginning => "beginning",
            ArcStage::Middle => "middle",
            ArcStage::End => "end",
        }
    }
}

/// Emotion names per arc stage (no intensities)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionalArc {
    #[serde(default)]
    pub beginning: Vec<String>,
    #[serde(default)]
    pub middle: Vec<String>,
    #[serde(default)]
    pub end: Vec<String>,
}

impl EmotionalArc {
    pub fn stage(&self, stage: ArcStage) -> &[String] {
        match stage {
            ArcStage::Beginning => &self.beginning,
            ArcStage::Middle => &self.middle,
            ArcStage::End => &self.end,
        }
    }

    pub fn stage_mut(&mut self, stage: ArcStage) -> &mut Vec<String> {
        match stage {
            ArcStage::Beginning => &mut self.beginning,
            ArcStage::Middle => &mut self.middle,
            ArcStage::End => &mut self.end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.beginning.is_empty() && self.middle.is_empty() && self.end.is_empty()
    }

    fn from_value(value: &Value) -> Self {
        let mut arc = Self::default();
        for stage in ArcStage::ALL {
            if let Some(stage_value) = value.get(stage.as_str()) {
                *arc.stage_mut(stage) = string_list(stage_value);
            }
        }
        arc
    }
}

/// Canonical analysis result for one piece of text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    #[serde(default)]
    pub primary_emotions: Vec<EmotionIntensity>,

    #[serde(default)]
    pub emotional_arc: EmotionalArc,

    #[serde(default)]
    pub unexpected_emotions: Vec<String>,

    #[serde(default)]
    pub lasting_impact: String,

    #[serde(default)]
    pub emotional_keywords: Vec<String>,

    #[serde(default, rename = "overall_emotional_profile")]
    pub overall_summary: String,
}

impl EmotionProfile {
    /// Default profile used whenever analysis is impossible or fails
    pub fn neutral() -> Self {
        Self {
            primary_emotions: vec![EmotionIntensity::new("neutral", 5.0)],
            emotional_arc: EmotionalArc {
                beginning: vec!["neutral".to_string()],
                middle: vec!["neutral".to_string()],
                end: vec!["neutral".to_string()],
            },
            unexpected_emotions: Vec::new(),
            lasting_impact: "Unknown".to_string(),
            emotional_keywords: Vec::new(),
            overall_summary: "Neutral emotional profile".to_string(),
        }
    }

    /// Decode a best-effort JSON document from the analysis service
    ///
    /// Missing or malformed fields become empty. Entries whose intensity is
    /// not numeric are dropped; numeric intensities are clamped to 0-10.
    pub fn from_value(value: &Value) -> Self {
        let primary_emotions = value
            .get("primary_emotions")
            .map(emotion_entries)
            .unwrap_or_default();

        Self {
            primary_emotions,
            emotional_arc: value
                .get("emotional_arc")
                .map(EmotionalArc::from_value)
                .unwrap_or_default(),
            unexpected_emotions: value
                .get("unexpected_emotions")
                .map(string_list)
                .unwrap_or_default(),
            lasting_impact: text_field(value, "lasting_impact"),
            emotional_keywords: value
                .get("emotional_keywords")
                .map(string_list)
                .unwrap_or_default(),
            overall_summary: text_field(value, "overall_emotional_profile"),
        }
    }

    /// Primary emotions with duplicate names collapsed to their max intensity
    ///
    /// Names are compared trimmed and case-insensitively and returned in
    /// lowercase, in first-seen order.
    pub fn deduplicated_emotions(&self) -> Vec<EmotionIntensity> {
        dedup_max(&self.primary_emotions)
    }

    pub fn is_empty(&self) -> bool {
        self.primary_emotions.is_empty()
            && self.emotional_arc.is_empty()
            && self.unexpected_emotions.is_empty()
            && self.emotional_keywords.is_empty()
            && self.lasting_impact.is_empty()
            && self.overall_summary.is_empty()
    }
}

/// Collapse duplicate emotion names, keeping the maximum intensity
pub fn dedup_max(entries: &[EmotionIntensity]) -> Vec<EmotionIntensity> {
    let mut order: Vec<String> = Vec::new();
    let mut max_by_name: HashMap<String, f64> = HashMap::new();

    for entry in entries {
        let name = entry.emotion.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        match max_by_name.get_mut(&name) {
            Some(current) => {
                if entry.intensity > *current {
                    *current = entry.intensity;
                }
            }
            None => {
                max_by_name.insert(name.clone(), entry.intensity);
                order.push(name);
            }
        }
    }

    order
        .into_iter()
        .map(|name| {
            let intensity = max_by_name.get(&name).copied().unwrap_or(0.0);
            EmotionIntensity::new(name, intensity)
        })
        .collect()
}

/// Analysis of a reader's mood request
///
/// Alternative response shape the service may produce for mood queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserQueryProfile {
    #[serde(default)]
    pub current_emotional_state: Vec<String>,
    #[serde(default)]
    pub desired_emotional_experience: Vec<String>,
    #[serde(default)]
    pub emotional_journey: EmotionalArc,
    #[serde(default)]
    pub intensity_preference: Option<String>,
    #[serde(default)]
    pub emotional_keywords: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl UserQueryProfile {
    pub fn from_value(value: &Value) -> Self {
        Self {
            current_emotional_state: value
                .get("current_emotional_state")
                .map(string_list)
                .unwrap_or_default(),
            desired_emotional_experience: value
                .get("desired_emotional_experience")
                .map(string_list)
                .unwrap_or_default(),
            emotional_journey: value
                .get("emotional_journey")
                .map(EmotionalArc::from_value)
                .unwrap_or_default(),
            intensity_preference: value
                .get("intensity_preference")
                .and_then(Value::as_str)
                .map(str::to_string),
            emotional_keywords: value
                .get("emotional_keywords")
                .map(string_list)
                .unwrap_or_default(),
            summary: text_field(value, "summary"),
        }
    }

    /// Intensity (0-10) implied by the stated preference
    pub fn preference_intensity(&self) -> f64 {
        match self
            .intensity_preference
            .as_deref()
            .map(|p| p.trim().to_lowercase())
            .as_deref()
        {
            Some("high") => 9.0,
            Some("low") => 4.0,
            _ => 7.0,
        }
    }

    /// Desired emotions at the preference intensity
    ///
    /// Falls back to the journey's end stage when nothing is desired.
    pub fn desired_entries(&self) -> Vec<EmotionIntensity> {
        let intensity = self.preference_intensity();
        let names = if self.desired_emotional_experience.is_empty() {
            &self.emotional_journey.end
        } else {
            &self.desired_emotional_experience
        };
        names
            .iter()
            .map(|name| EmotionIntensity::new(name.clone(), intensity))
            .collect()
    }

    /// View this query as an emotion profile for explanation matching
    pub fn to_emotion_profile(&self) -> EmotionProfile {
        EmotionProfile {
            primary_emotions: self.desired_entries(),
            emotional_arc: self.emotional_journey.clone(),
            unexpected_emotions: Vec::new(),
            lasting_impact: String::new(),
            emotional_keywords: self.emotional_keywords.clone(),
            overall_summary: self.summary.clone(),
        }
    }
}

// ============================================================================
// Lenient JSON helpers
// ============================================================================

/// Parse `[{emotion, intensity}, ...]`, dropping malformed entries
pub(crate) fn emotion_entries(value: &Value) -> Vec<EmotionIntensity> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let emotion = item.get("emotion")?.as_str()?.trim();
            if emotion.is_empty() {
                return None;
            }
            let intensity = intensity_value(item.get("intensity")?)?;
            Some(EmotionIntensity::new(emotion, intensity))
        })
        .collect()
}

/// Numeric or numeric-string intensity clamped to the profile scale
fn intensity_value(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if raw.is_finite() {
        Some(raw.clamp(0.0, PROFILE_SCALE_MAX))
    } else {
        None
    }
}

/// List of strings; a bare string becomes a one-element list
pub(crate) fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
