// src/services/parser.rs

use std::fmt;

use serde_json::{Map, Value};

use crate::config::{DEFAULT_CATEGORY, LABELS};
use crate::models::question::Question;

/// Structural reasons the generated output could not be read.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseFailure {
    /// No `[` anywhere in the output.
    NoArrayDelimiters,
    /// The delimited slice is missing its `]` or is not a JSON array.
    /// Carries the decoder message.
    MalformedJson(String),
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::NoArrayDelimiters => write!(f, "no JSON array found in the response"),
            ParseFailure::MalformedJson(detail) => write!(f, "malformed JSON array ({})", detail),
        }
    }
}

impl std::error::Error for ParseFailure {}

const SCHEMA_FIELDS: [&str; 6] = ["question", "choices", "answer", "explanation", "excerpt", "category"];

/// Reads the question array out of raw model output.
///
/// Takes the slice from the first `[` to the last `]`, decodes it as a JSON
/// array and normalizes every element. Field-level problems are corrected
/// in place; only a missing or undecodable array is reported as a failure.
/// An opening `[` without a closing `]` after it counts as truncated output.
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, ParseFailure> {
    let start = raw.find('[').ok_or(ParseFailure::NoArrayDelimiters)?;
    let end = raw
        .rfind(']')
        .filter(|&end| end > start)
        .ok_or_else(|| ParseFailure::MalformedJson("unterminated array".to_string()))?;

    let items: Vec<Value> = serde_json::from_str(&raw[start..=end])
        .map_err(|e| ParseFailure::MalformedJson(e.to_string()))?;

    Ok(items.iter().map(normalize_question).collect())
}

fn normalize_question(item: &Value) -> Question {
    let empty = Map::new();
    let fields = item.as_object().unwrap_or(&empty);

    let choices = match fields.get("choices").unwrap_or(&Value::Null) {
        Value::Array(values) => values.iter().map(stringify).collect(),
        other => vec![stringify(other)],
    };

    let extra = fields
        .iter()
        .filter(|(key, _)| !SCHEMA_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Question {
        question: fields.get("question").map(stringify).unwrap_or_default(),
        choices,
        answer: normalize_answer(fields.get("answer")),
        explanation: text_or(fields.get("explanation"), ""),
        excerpt: text_or(fields.get("excerpt"), ""),
        category: text_or(fields.get("category"), DEFAULT_CATEGORY),
        extra,
    }
}

/// Trimmed, uppercased single letter; "A" when the value is not a usable string.
fn normalize_answer(value: Option<&Value>) -> String {
    let Some(Value::String(raw)) = value else {
        return LABELS[0].to_string();
    };

    let upper = raw.trim().to_uppercase();
    let mut chars = upper.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => letter.to_string(),
        // Answers like "B) Paris" or "Option C": keep the first label letter.
        _ => upper
            .split(|c: char| !c.is_ascii_alphanumeric())
            .find(|token| LABELS.contains(token))
            .or_else(|| upper.get(..1).filter(|s| s.chars().all(|c| c.is_ascii_alphabetic())))
            .unwrap_or(LABELS[0])
            .to_string(),
    }
}

/// The value's text when it is truthy, otherwise `fallback`.
fn text_or(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(v) if is_truthy(v) => stringify(v),
        _ => fallback.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings as-is, everything else as its JSON text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
