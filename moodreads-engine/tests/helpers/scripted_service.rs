//! Scripted text-analysis service
//!
//! In-process stand-in for the remote service. Replies are chosen by the
//! first rule whose needle occurs in the prompt; every call is counted.

use async_trait::async_trait;
use moodreads_engine::services::{AnalysisRequest, LlmError, TextAnalysisService};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
    Delay(Duration, String),
}

pub struct ScriptedAnalysisService {
    rules: Vec<(String, Scripted)>,
    fallback: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAnalysisService {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: "I have no opinion.".to_string(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `reply` when the prompt contains `needle`
    pub fn reply(mut self, needle: &str, reply: impl Into<String>) -> Self {
        self.rules.push((needle.to_string(), Scripted::Reply(reply.into())));
        self
    }

    /// Fail with a network error when the prompt contains `needle`
    pub fn fail(mut self, needle: &str) -> Self {
        self.rules
            .push((needle.to_string(), Scripted::Fail(format!("connection refused for {}", needle))));
        self
    }

    /// Sleep before replying when the prompt contains `needle`
    pub fn delay(mut self, needle: &str, delay: Duration, reply: impl Into<String>) -> Self {
        self.rules
            .push((needle.to_string(), Scripted::Delay(delay, reply.into())));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextAnalysisService for ScriptedAnalysisService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &AnalysisRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());

        let rule = self
            .rules
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, scripted)| scripted.clone());

        match rule {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(message)) => Err(LlmError::Network(message)),
            Some(Scripted::Delay(delay, reply)) => {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Service reply wrapping a profile with the given primary emotions
pub fn profile_reply(emotions: &[(&str, f64)], summary: &str) -> String {
    let primary: Vec<_> = emotions
        .iter()
        .map(|(emotion, intensity)| json!({"emotion": emotion, "intensity": intensity}))
        .collect();
    let names: Vec<&str> = emotions.iter().map(|(emotion, _)| *emotion).collect();
    let body = json!({
        "primary_emotions": primary,
        "emotional_arc": {"beginning": [], "middle": [], "end": names},
        "unexpected_emotions": [],
        "lasting_impact": "",
        "emotional_keywords": names,
        "overall_emotional_profile": summary,
    });
    format!("Here is the analysis:\n```json\n{}\n```", body)
}
