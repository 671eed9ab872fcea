use serde_json::Value;
use std::fmt;

use crate::config::Models;

/// One entry in the selection table.
#[derive(Clone)]
pub struct SelectionRule {
    pub name: &'static str,
    pub matches: fn(&Value) -> bool,
    pub model: String,
}

impl fmt::Debug for SelectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionRule")
            .field("name", &self.name)
            .field("model", &self.model)
            .finish()
    }
}

/// Ordered predicate/model table. The first matching rule wins.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    rules: Vec<SelectionRule>,
    fallback: String,
}

impl ModelSelector {
    pub fn new(rules: Vec<SelectionRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Table for the bare proxy: audio output, then inline data, then plain text.
    pub fn for_proxy(models: &Models) -> Self {
        Self::new(
            vec![
                SelectionRule {
                    name: "audio-output",
                    matches: requests_audio,
                    model: models.tts.clone(),
                },
                SelectionRule {
                    name: "inline-data",
                    matches: has_inline_data,
                    model: models.vision.clone(),
                },
            ],
            models.text.clone(),
        )
    }

    pub fn select(&self, body: &Value) -> &str {
        match self.rules.iter().find(|rule| (rule.matches)(body)) {
            Some(rule) => {
                tracing::debug!("Model rule '{}' matched", rule.name);
                &rule.model
            }
            None => &self.fallback,
        }
    }
}

/// `generationConfig.responseModalities` contains `"AUDIO"`.
pub fn requests_audio(body: &Value) -> bool {
    body.pointer("/generationConfig/responseModalities")
        .and_then(Value::as_array)
        .map(|modalities| modalities.iter().any(|m| m.as_str() == Some("AUDIO")))
        .unwrap_or(false)
}

/// Some element of `contents` carries inline data, either on itself or in one of its parts.
pub fn has_inline_data(body: &Value) -> bool {
    let Some(contents) = body.get("contents").and_then(Value::as_array) else {
        return false;
    };

    contents.iter().any(|content| {
        is_inline(content)
            || content
                .get("parts")
                .and_then(Value::as_array)
                .map(|parts| parts.iter().any(is_inline))
                .unwrap_or(false)
    })
}

fn is_inline(value: &Value) -> bool {
    ["inlineData", "inline_data"]
        .iter()
        .any(|field| value.get(field).map(|v| !v.is_null()).unwrap_or(false))
}
