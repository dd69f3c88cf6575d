// src/models/question.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::LABELS;

/// A generated multiple-choice question.
///
/// Built once by the response parser and never mutated afterwards; answer
/// state lives in the session, keyed by the question's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// The text of the question.
    pub question: String,

    /// Options in the order the model returned them.
    /// Position 0..3 maps to labels A..D; anything past the fourth is unreachable.
    pub choices: Vec<String>,

    /// Uppercase single-letter label of the correct choice, as the model claimed it.
    pub answer: String,

    pub explanation: String,

    /// Passage of the study text supporting the answer.
    pub excerpt: String,

    pub category: String,

    /// Fields the model sent that are not part of the schema.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Question {
    /// Labels the user can actually pick for this question.
    pub fn labels(&self) -> &'static [&'static str] {
        labels_for(self.choices.len())
    }

    /// The answer letter used for grading.
    ///
    /// The claimed letter when it names a reachable choice, otherwise the
    /// first reachable label. A question with no choices keeps its claimed letter.
    pub fn resolved_answer(&self) -> &str {
        match self.labels() {
            [] => self.answer.as_str(),
            labels if labels.contains(&self.answer.as_str()) => self.answer.as_str(),
            [first, ..] => *first,
        }
    }

    /// Position of the resolved answer within `choices`, if any choice exists.
    pub fn answer_position(&self) -> Option<usize> {
        label_position(self.resolved_answer()).filter(|&pos| pos < self.choices.len())
    }
}

/// Labels covering the first `choice_count` positions, capped at four.
pub fn labels_for(choice_count: usize) -> &'static [&'static str] {
    &LABELS[..choice_count.min(LABELS.len())]
}

/// Position of a label ("A" => 0), case-insensitive.
pub fn label_position(label: &str) -> Option<usize> {
    let normalized = label.trim().to_uppercase();
    LABELS.iter().position(|l| *l == normalized)
}

#[cfg(test)]
pub(crate) fn sample(answer: &str, choices: &[&str], category: &str) -> Question {
    Question {
        question: format!("Which one is {}?", answer),
        choices: choices.iter().map(|c| c.to_string()).collect(),
        answer: answer.to_string(),
        explanation: String::new(),
        excerpt: String::new(),
        category: category.to_string(),
        extra: Map::new(),
    }
}
