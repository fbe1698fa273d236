//! Emotion extraction via the text-analysis service
//!
//! Wraps a text excerpt (book description, concatenated reviews or a mood
//! sentence) in a fixed instruction template, sends it to the analysis
//! service and pulls one JSON document out of the free-form reply.
//!
//! **Parsing cascade:**
//! 1. Fenced ```` ```json ```` block
//! 2. First `{` to last `}` span
//! 3. Otherwise unparseable
//!
//! Nothing here returns an error to the caller. Unparseable replies come
//! back as an explicit marker; transport failures as `ServiceFailed`.
//! Only successful parses are written to the cache.

use super::analysis_service::{AnalysisRequest, TextAnalysisService};
use super::emotion_cache::{CacheKind, EmotionCache};
use crate::models::EmotionProfile;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Bumped whenever a template changes so stale cache entries miss
pub const PROMPT_TEMPLATE_VERSION: &str = "v1";

/// Error marker text for replies with no decodable JSON
pub const PARSE_FAILURE_MARKER: &str = "JSON parsing failed";

const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.2;
const AXIS_MAX_TOKENS: u32 = 20;

const SYSTEM_PROMPT: &str = "You are a literary analyst who reads book texts for their emotional \
content. You answer with a single JSON object and nothing else.";

const PROFILE_SHAPE: &str = r#"Return a JSON object with these fields:
- "primary_emotions": array of {"emotion": string, "intensity": number from 0 to 10}
- "emotional_arc": object with "beginning", "middle" and "end", each an array of emotion names
- "unexpected_emotions": array of emotion names a reader might not expect
- "lasting_impact": one sentence on the lasting emotional impact
- "emotional_keywords": array of emotional words or phrases
- "overall_emotional_profile": short summary of the overall emotional character"#;

/// Optional context embedded in description prompts
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub title: Option<String>,
    pub genres: Vec<String>,
}

impl AnalysisContext {
    pub fn new(title: impl Into<String>, genres: &[String]) -> Self {
        Self {
            title: Some(title.into()),
            genres: genres.to_vec(),
        }
    }
}

/// Result of one extraction
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Decoded JSON document (cached or fresh)
    Parsed(Value),
    /// Service answered but no JSON could be decoded
    Unparseable { error: String, raw_response: String },
    /// Service call itself failed
    ServiceFailed(String),
}

impl AnalysisOutcome {
    /// Whether callers should fall back to the neutral profile
    pub fn is_error(&self) -> bool {
        match self {
            AnalysisOutcome::Parsed(value) => value.get("error").is_some(),
            _ => true,
        }
    }

    pub fn is_service_failure(&self) -> bool {
        matches!(self, AnalysisOutcome::ServiceFailed(_))
    }

    /// JSON view, with `{error, raw_response}` for unparseable replies
    pub fn to_value(&self) -> Value {
        match self {
            AnalysisOutcome::Parsed(value) => value.clone(),
            AnalysisOutcome::Unparseable {
                error,
                raw_response,
            } => json!({ "error": error, "raw_response": raw_response }),
            AnalysisOutcome::ServiceFailed(message) => json!({ "error": message }),
        }
    }

    /// Decoded profile, or the neutral profile on any error
    pub fn into_profile(self) -> EmotionProfile {
        match self {
            AnalysisOutcome::Parsed(value) if value.get("error").is_none() => {
                EmotionProfile::from_value(&value)
            }
            _ => EmotionProfile::neutral(),
        }
    }
}

/// Pull one JSON document out of a free-form reply
pub fn parse_response(text: &str) -> Option<Value> {
    if let Some(block) = fenced_block(text) {
        if let Ok(value) = serde_json::from_str::<Value>(block) {
            return Some(value);
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&text[start..=end]).ok()
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Reviews joined the way the review template expects them
pub fn join_reviews(reviews: &[String]) -> String {
    reviews
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .enumerate()
        .map(|(i, review)| format!("Review {}:\n{}", i + 1, review))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Mood sentence sent for query analysis
pub fn mood_sentence(mood_text: &str) -> String {
    format!("A book that makes me feel {}", mood_text.trim())
}

fn description_prompt(text: &str, context: &AnalysisContext) -> String {
    let mut prompt = String::from(
        "Analyze the emotional content of this book description.\n\n",
    );
    if let Some(title) = context.title.as_deref().filter(|t| !t.trim().is_empty()) {
        prompt.push_str(&format!("Title: {}\n", title.trim()));
    }
    if !context.genres.is_empty() {
        prompt.push_str(&format!("Genres: {}\n", context.genres.join(", ")));
    }
    prompt.push_str(PROFILE_SHAPE);
    prompt.push_str("\n\nBook description:\n");
    prompt.push_str(text);
    prompt
}

fn reviews_prompt(joined_reviews: &str) -> String {
    format!(
        "Below are several reader reviews of one book. Analyze them together to build the \
         emotional profile readers experienced, including how the feeling changed from \
         beginning to end.\n\n{}\n\nReviews:\n{}",
        PROFILE_SHAPE, joined_reviews
    )
}

fn query_prompt(sentence: &str) -> String {
    format!(
        "A reader describes the book they want. Analyze the emotions they want the book to \
         evoke.\n\n{}\n\nReader request:\n{}",
        PROFILE_SHAPE, sentence
    )
}

fn axis_prompt(name: &str, axes: &[&str]) -> String {
    format!(
        "Which one of these emotions is closest in meaning to \"{}\"?\n{}\n\nAnswer with \
         exactly one emotion from the list and nothing else.",
        name,
        axes.join(", ")
    )
}

/// Earliest canonical axis named as a whole word in a reply
fn first_axis_mentioned(reply: &str, axes: &[&str]) -> Option<usize> {
    let lowered = reply.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .find_map(|word| axes.iter().position(|axis| *axis == word))
}

/// Analysis-service front end with write-through caching
pub struct EmotionExtractor {
    service: Arc<dyn TextAnalysisService>,
    cache: Arc<EmotionCache>,
    max_tokens: u32,
    temperature: f32,
}

impl EmotionExtractor {
    pub fn new(service: Arc<dyn TextAnalysisService>, cache: Arc<EmotionCache>) -> Self {
        Self {
            service,
            cache,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_limits(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn cache(&self) -> &EmotionCache {
        &self.cache
    }

    /// Analyze a book description
    ///
    /// # Arguments
    /// * `text` - Description text; empty yields the neutral profile
    /// * `context` - Title and genres embedded in the prompt
    pub async fn analyze_description(&self, text: &str, context: &AnalysisContext) -> AnalysisOutcome {
        let prompt = description_prompt(text, context);
        self.analyze(CacheKind::Description, text, prompt).await
    }

    /// Analyze a set of reader reviews as one body of text
    pub async fn analyze_reviews(&self, reviews: &[String]) -> AnalysisOutcome {
        let joined = join_reviews(reviews);
        let prompt = reviews_prompt(&joined);
        self.analyze(CacheKind::Reviews, &joined, prompt).await
    }

    /// Analyze a reader's mood text
    ///
    /// The text is wrapped in a fixed sentence first so query prompts have
    /// the same shape as book prompts.
    pub async fn analyze_query(&self, mood_text: &str) -> AnalysisOutcome {
        if mood_text.trim().is_empty() {
            return neutral_outcome();
        }
        let sentence = mood_sentence(mood_text);
        let prompt = query_prompt(&sentence);
        self.analyze(CacheKind::Query, &sentence, prompt).await
    }

    async fn analyze(&self, kind: CacheKind, text: &str, prompt: String) -> AnalysisOutcome {
        if text.trim().is_empty() {
            debug!(kind = kind.as_str(), "Empty input, using neutral profile");
            return neutral_outcome();
        }

        if let Some(cached) = self.cache.get(kind, text) {
            return AnalysisOutcome::Parsed(cached);
        }

        let request = AnalysisRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let reply = match self.service.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(kind = kind.as_str(), service = self.service.name(), error = %e, "Analysis service call failed");
                return AnalysisOutcome::ServiceFailed(e.to_string());
            }
        };

        match parse_response(&reply) {
            Some(value) => {
                if is_cacheable(&value) {
                    if let Err(e) = self.cache.put(kind, text, value.clone()) {
                        warn!(kind = kind.as_str(), error = %e, "Failed to persist analysis");
                    }
                } else {
                    warn!(kind = kind.as_str(), "Analysis reply is not a profile object, not caching");
                }
                AnalysisOutcome::Parsed(value)
            }
            None => {
                warn!(kind = kind.as_str(), reply_len = reply.len(), "Analysis reply had no parseable JSON");
                AnalysisOutcome::Unparseable {
                    error: PARSE_FAILURE_MARKER.to_string(),
                    raw_response: reply,
                }
            }
        }
    }

    /// Ask the service which canonical axis is closest to `name`
    ///
    /// # Returns
    /// Index into `axes`, or `None` when the service fails or names no axis
    pub async fn closest_axis(&self, name: &str, axes: &[&str]) -> Option<usize> {
        let name = name.trim().to_lowercase();
        if name.is_empty() || axes.is_empty() {
            return None;
        }

        if let Some(cached) = self.cache.get(CacheKind::Axis, &name) {
            if let Some(index) = cached.as_str().and_then(|axis| axes.iter().position(|a| *a == axis)) {
                return Some(index);
            }
        }

        let request = AnalysisRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: axis_prompt(&name, axes),
            max_tokens: AXIS_MAX_TOKENS,
            temperature: 0.0,
        };

        let reply = match self.service.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(emotion = %name, error = %e, "Axis resolution call failed");
                return None;
            }
        };

        let index = first_axis_mentioned(&reply, axes)?;
        if let Err(e) = self.cache.put(CacheKind::Axis, &name, Value::String(axes[index].to_string())) {
            warn!(emotion = %name, error = %e, "Failed to persist axis resolution");
        }
        debug!(emotion = %name, axis = axes[index], "Service resolved emotion axis");
        Some(index)
    }
}

/// Only profile-shaped objects are written to the cache
fn is_cacheable(value: &Value) -> bool {
    value.as_object().map(|object| !object.contains_key("error")).unwrap_or(false)
}

fn neutral_outcome() -> AnalysisOutcome {
    match serde_json::to_value(EmotionProfile::neutral()) {
        Ok(value) => AnalysisOutcome::Parsed(value),
        Err(e) => AnalysisOutcome::ServiceFailed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_block() {
        let reply = "Here you go:\n```json\n{\"primary_emotions\": []}\n```\nThanks";
        assert_eq!(parse_response(reply), Some(json!({"primary_emotions": []})));
    }

    #[test]
    fn test_parse_bare_braces() {
        let reply = "Sure. {\"lasting_impact\": \"deep\", \"emotional_arc\": {\"end\": [\"hope\"]}} Done.";
        let value = parse_response(reply).unwrap();
        assert_eq!(value["emotional_arc"]["end"][0], "hope");
    }

    #[test]
    fn test_parse_bad_fence_falls_back_to_braces() {
        let reply = "```\nnot json\n``` but later {\"a\": 1}";
        // The first-to-last brace span is the only decodable candidate
        assert_eq!(parse_response(reply), Some(json!({"a": 1})));
    }

    #[test]
    fn test_parse_failure() {
        assert_eq!(parse_response("I cannot help with that."), None);
        assert_eq!(parse_response("} backwards {"), None);
    }

    #[test]
    fn test_unparseable_outcome_shape() {
        let outcome = AnalysisOutcome::Unparseable {
            error: PARSE_FAILURE_MARKER.to_string(),
            raw_response: "nope".to_string(),
        };
        let value = outcome.to_value();
        assert_eq!(value["error"], "JSON parsing failed");
        assert_eq!(value["raw_response"], "nope");
        assert!(outcome.is_error());
        assert_eq!(outcome.into_profile(), EmotionProfile::neutral());
    }

    #[test]
    fn test_join_reviews_numbering() {
        let reviews = vec!["Loved it".to_string(), "  ".to_string(), "Cried".to_string()];
        assert_eq!(join_reviews(&reviews), "Review 1:\nLoved it\n\nReview 2:\nCried");
    }

    #[test]
    fn test_first_axis_mentioned() {
        let axes = ["joy", "awe", "comfort"];
        assert_eq!(first_axis_mentioned("Comfort, maybe awe", &axes), Some(2));
        assert_eq!(first_axis_mentioned("none of these", &axes), None);
    }

    #[test]
    fn test_first_axis_mentioned_needs_whole_word() {
        let axes = ["joy", "hope", "despair"];
        assert_eq!(first_axis_mentioned("Enjoyment", &axes), None);
        assert_eq!(first_axis_mentioned("hopeless, so despair.", &axes), Some(2));
        assert_eq!(first_axis_mentioned("\"Hope\"", &axes), Some(1));
    }

    #[test]
    fn test_description_prompt_embeds_context() {
        let context = AnalysisContext::new("Dune", &["science fiction".to_string()]);
        let prompt = description_prompt("Sand and spice.", &context);
        assert!(prompt.contains("Title: Dune"));
        assert!(prompt.contains("Genres: science fiction"));
        assert!(prompt.ends_with("Sand and spice."));
    }
}
