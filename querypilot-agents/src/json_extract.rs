//! Recovery of a JSON object from free-text model output.
//!
//! Permissive about wrapping (code fences, commentary before or after the
//! object), strict about the final parse.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Longest slice of the offending text kept in error messages
const MAX_ERROR_TEXT: usize = 500;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JsonExtractError {
    #[error("no JSON object found in: {}", preview(.text))]
    NoObject { text: String },
    #[error("invalid JSON object ({reason}) in: {}", preview(.text))]
    InvalidJson { reason: String, text: String },
}

impl JsonExtractError {
    /// The text that could not be parsed
    pub fn text(&self) -> &str {
        match self {
            JsonExtractError::NoObject { text } | JsonExtractError::InvalidJson { text, .. } => {
                text
            }
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_TEXT {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_ERROR_TEXT).collect();
        format!("{}...", head)
    }
}

fn fence_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\n?(.*?)\n?```$").expect("fence pattern is valid")
    })
}

/// Extract the JSON object embedded in `raw`
pub fn extract_json(raw: &str) -> Result<Map<String, Value>, JsonExtractError> {
    let trimmed = raw.trim();

    let unfenced = fence_regex()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    let (Some(start), Some(end)) = (unfenced.find('{'), unfenced.rfind('}')) else {
        return Err(JsonExtractError::NoObject {
            text: raw.to_string(),
        });
    };
    if end < start {
        return Err(JsonExtractError::NoObject {
            text: raw.to_string(),
        });
    }

    match serde_json::from_str::<Value>(&unfenced[start..=end]) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(JsonExtractError::InvalidJson {
            reason: "not an object".to_string(),
            text: raw.to_string(),
        }),
        Err(e) => Err(JsonExtractError::InvalidJson {
            reason: e.to_string(),
            text: raw.to_string(),
        }),
    }
}
