//! Emotion name → canonical axis resolution
//!
//! **Resolution cascade:**
//! 1. No-signal names (`neutral`, `none`, ...) resolve to nothing
//! 2. Exact match against the canonical axes
//! 3. Substring match, either direction
//! 4. Static alias table
//! 5. Pluggable fallback resolver (normally the analysis service), memoized
//! 6. Axis 0 as last resort
//!
//! Steps 1-4 are deterministic and local. The fallback is optional so tests
//! can run the cascade without a service.

use super::axes::{axis_index, CANONICAL_AXES};
use crate::services::EmotionExtractor;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Shortest name allowed to match inside a longer axis name
const MIN_CONTAINED_LEN: usize = 3;

static NO_SIGNAL_NAMES: [&str; 6] = ["", "neutral", "none", "n/a", "na", "unknown"];

static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Everyday mood words
        ("happy", "joy"),
        ("happiness", "joy"),
        ("delight", "joy"),
        ("amusement", "joy"),
        ("humor", "joy"),
        ("humour", "joy"),
        ("satisfaction", "joy"),
        ("sad", "sadness"),
        ("sorrow", "sadness"),
        ("grief", "sadness"),
        ("heartbreak", "sadness"),
        ("angry", "anger"),
        ("rage", "anger"),
        ("fury", "anger"),
        ("frustration", "anger"),
        ("scared", "fear"),
        ("dread", "fear"),
        ("terror", "fear"),
        ("horror", "fear"),
        ("shock", "surprise"),
        ("astonishment", "surprise"),
        ("excited", "excitement"),
        ("thrill", "excitement"),
        ("thrilling", "excitement"),
        ("exhilaration", "excitement"),
        ("reflective", "reflection"),
        ("contemplative", "reflection"),
        ("contemplation", "reflection"),
        ("thoughtful", "reflection"),
        ("introspection", "reflection"),
        ("introspective", "reflection"),
        ("pensive", "reflection"),
        ("tense", "tension"),
        ("suspense", "tension"),
        ("suspenseful", "tension"),
        ("calm", "comfort"),
        ("peaceful", "comfort"),
        ("peace", "comfort"),
        ("serene", "comfort"),
        ("serenity", "comfort"),
        ("cozy", "comfort"),
        ("cosy", "comfort"),
        ("warmth", "comfort"),
        ("heartwarming", "comfort"),
        ("contentment", "comfort"),
        ("relaxed", "comfort"),
        ("indignation", "outrage"),
        ("injustice", "outrage"),
        ("melancholic", "melancholy"),
        ("loneliness", "melancholy"),
        ("longing", "melancholy"),
        ("nostalgic", "nostalgia"),
        ("wistful", "nostalgia"),
        ("uplifting", "hope"),
        ("inspiration", "hope"),
        ("inspired", "hope"),
        ("inspiring", "hope"),
        ("optimism", "hope"),
        ("optimistic", "hope"),
        ("curious", "curiosity"),
        ("intrigue", "curiosity"),
        ("wisdom", "curiosity"),
        ("confused", "confusion"),
        ("enlightenment", "awe"),
        ("amazement", "awe"),
        ("romance", "love"),
        ("romantic", "love"),
        ("tenderness", "love"),
        ("compassion", "love"),
        ("empathy", "love"),
        ("anxious", "anxiety"),
        ("nervous", "anxiety"),
        ("unease", "anxiety"),
        ("uneasy", "anxiety"),
        ("worry", "anxiety"),
        ("panic", "anxiety"),
        ("relieved", "relief"),
        ("proud", "pride"),
        ("guilt", "shame"),
        ("brave", "courage"),
        ("bravery", "courage"),
        ("determination", "courage"),
        ("freedom", "liberation"),
        ("empowerment", "liberation"),
    ])
});

/// Outcome of resolving one emotion name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Index into the canonical axes
    Axis(usize),
    /// Name deliberately carries no emotional signal
    NoSignal,
    /// This strategy could not decide
    Unresolved,
}

/// Strategy mapping free-form emotion names to canonical axes
#[async_trait]
pub trait EmotionResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Resolution;
}

/// Deterministic local strategy: no-signal set, exact, substring, alias
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResolver;

impl LocalResolver {
    pub fn resolve_local(&self, name: &str) -> Resolution {
        let name = name.trim().to_lowercase();

        if NO_SIGNAL_NAMES.contains(&name.as_str()) {
            return Resolution::NoSignal;
        }

        if let Some(index) = axis_index(&name) {
            return Resolution::Axis(index);
        }

        let substring_hit = CANONICAL_AXES.iter().position(|axis| {
            name.contains(axis) || (name.len() >= MIN_CONTAINED_LEN && axis.contains(name.as_str()))
        });
        if let Some(index) = substring_hit {
            return Resolution::Axis(index);
        }

        match ALIASES.get(name.as_str()).and_then(|axis| axis_index(axis)) {
            Some(index) => Resolution::Axis(index),
            None => Resolution::Unresolved,
        }
    }
}

#[async_trait]
impl EmotionResolver for LocalResolver {
    async fn resolve(&self, name: &str) -> Resolution {
        self.resolve_local(name)
    }
}

/// Asks the analysis service to pick the closest canonical axis
pub struct ServiceResolver {
    extractor: Arc<EmotionExtractor>,
}

impl ServiceResolver {
    pub fn new(extractor: Arc<EmotionExtractor>) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl EmotionResolver for ServiceResolver {
    async fn resolve(&self, name: &str) -> Resolution {
        match self.extractor.closest_axis(name, &CANONICAL_AXES).await {
            Some(index) => Resolution::Axis(index),
            None => Resolution::Unresolved,
        }
    }
}

/// Full cascade: local strategy, memoized fallback, then axis 0
///
/// Never returns `Unresolved`.
pub struct CascadingResolver {
    local: LocalResolver,
    fallback: Option<Arc<dyn EmotionResolver>>,
    memo: Mutex<HashMap<String, usize>>,
}

impl CascadingResolver {
    /// Local strategy only; unresolvable names land on axis 0
    pub fn local_only() -> Self {
        Self {
            local: LocalResolver,
            fallback: None,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_fallback(fallback: Arc<dyn EmotionResolver>) -> Self {
        Self {
            fallback: Some(fallback),
            ..Self::local_only()
        }
    }

    fn memoized(&self, name: &str) -> Option<usize> {
        self.memo
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .copied()
    }

    fn remember(&self, name: String, index: usize) {
        self.memo
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name, index);
    }
}

#[async_trait]
impl EmotionResolver for CascadingResolver {
    async fn resolve(&self, name: &str) -> Resolution {
        let local = self.local.resolve_local(name);
        if local != Resolution::Unresolved {
            return local;
        }

        let key = name.trim().to_lowercase();
        if let Some(index) = self.memoized(&key) {
            return Resolution::Axis(index);
        }

        let answer = match &self.fallback {
            Some(fallback) => match fallback.resolve(&key).await {
                Resolution::Axis(index) if index < CANONICAL_AXES.len() => Some(index),
                _ => None,
            },
            None => None,
        };

        // Only real answers are memoized; the axis-0 default is retried next time
        match answer {
            Some(index) => {
                debug!(emotion = %key, axis = CANONICAL_AXES[index], "Resolved emotion outside local table");
                self.remember(key, index);
                Resolution::Axis(index)
            }
            None => {
                debug!(emotion = %key, "Emotion unresolved, defaulting to first axis");
                Resolution::Axis(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn axis(name: &str) -> Resolution {
        Resolution::Axis(axis_index(name).unwrap())
    }

    #[test]
    fn test_exact_and_case_insensitive() {
        let resolver = LocalResolver;
        assert_eq!(resolver.resolve_local("joy"), axis("joy"));
        assert_eq!(resolver.resolve_local("  Tension "), axis("tension"));
    }

    #[test]
    fn test_substring_either_direction() {
        let resolver = LocalResolver;
        assert_eq!(resolver.resolve_local("hopeful"), axis("hope"));
        assert_eq!(resolver.resolve_local("quiet reflection"), axis("reflection"));
        assert_eq!(resolver.resolve_local("nostalg"), axis("nostalgia"));
    }

    #[test]
    fn test_alias_table() {
        let resolver = LocalResolver;
        assert_eq!(resolver.resolve_local("wisdom"), axis("curiosity"));
        assert_eq!(resolver.resolve_local("enlightenment"), axis("awe"));
        assert_eq!(resolver.resolve_local("calm"), axis("comfort"));
        assert_eq!(resolver.resolve_local("reflective"), axis("reflection"));
        assert_eq!(resolver.resolve_local("dread"), axis("fear"));
    }

    #[test]
    fn test_no_signal_names() {
        let resolver = LocalResolver;
        assert_eq!(resolver.resolve_local("Neutral"), Resolution::NoSignal);
        assert_eq!(resolver.resolve_local(""), Resolution::NoSignal);
        assert_eq!(resolver.resolve_local("n/a"), Resolution::NoSignal);
    }

    #[test]
    fn test_short_fragment_not_matched_inside_axes() {
        assert_eq!(LocalResolver.resolve_local("zq"), Resolution::Unresolved);
    }

    struct CountingResolver {
        answer: Resolution,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmotionResolver for CountingResolver {
        async fn resolve(&self, _name: &str) -> Resolution {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    #[tokio::test]
    async fn test_cascade_memoizes_fallback() {
        let fallback = Arc::new(CountingResolver {
            answer: axis("awe"),
            calls: AtomicUsize::new(0),
        });
        let resolver = CascadingResolver::with_fallback(fallback.clone());

        assert_eq!(resolver.resolve("sublime").await, axis("awe"));
        assert_eq!(resolver.resolve("Sublime").await, axis("awe"));
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);

        // Local hits never reach the fallback
        assert_eq!(resolver.resolve("joy").await, axis("joy"));
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cascade_last_resort_axis_zero() {
        let fallback = Arc::new(CountingResolver {
            answer: Resolution::Unresolved,
            calls: AtomicUsize::new(0),
        });
        let resolver = CascadingResolver::with_fallback(fallback);
        assert_eq!(resolver.resolve("zzxq").await, Resolution::Axis(0));

        let local_only = CascadingResolver::local_only();
        assert_eq!(local_only.resolve("zzxq").await, Resolution::Axis(0));
        assert_eq!(local_only.resolve("neutral").await, Resolution::NoSignal);
    }

    /// Answers `Unresolved` until `failures` calls have been made
    struct RecoveringResolver {
        failures: usize,
        answer: Resolution,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmotionResolver for RecoveringResolver {
        async fn resolve(&self, _name: &str) -> Resolution {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Resolution::Unresolved
            } else {
                self.answer
            }
        }
    }

    #[tokio::test]
    async fn test_default_axis_not_memoized_after_failed_fallback() {
        let fallback = Arc::new(RecoveringResolver {
            failures: 1,
            answer: axis("awe"),
            calls: AtomicUsize::new(0),
        });
        let resolver = CascadingResolver::with_fallback(fallback.clone());

        assert_eq!(resolver.resolve("sublime").await, Resolution::Axis(0));
        assert_eq!(resolver.resolve("sublime").await, axis("awe"));
        assert_eq!(resolver.resolve("sublime").await, axis("awe"));
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 2);
    }
}
