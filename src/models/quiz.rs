// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::{MAX_QUESTION_COUNT, MIN_QUESTION_COUNT};
use crate::services::evaluator::ChoiceState;

/// DTO for starting a generation round.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    /// Credential for the generation service. Used for this call only.
    #[validate(custom(function = validate_not_blank))]
    pub api_key: String,

    /// Study text the questions are drawn from.
    #[validate(custom(function = validate_not_blank))]
    pub text: String,

    #[validate(range(min = MIN_QUESTION_COUNT, max = MAX_QUESTION_COUNT))]
    pub count: u32,
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("must_not_be_blank"));
    }
    Ok(())
}

/// DTO for answering one question.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Position of the question in the current set.
    pub index: usize,
    /// Selected label, case-insensitive.
    pub letter: String,
}

/// Query string for the quiz view.
#[derive(Debug, Default, Deserialize)]
pub struct QuizQuery {
    pub category: Option<String>,
}

/// Lifecycle phase of the session as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Generating,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub correct: usize,
    pub total: usize,
}

/// One rendered option of a question.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceView {
    pub label: &'static str,
    pub text: String,
    pub state: ChoiceState,
}

/// A question as the client sees it.
/// `answer`, `explanation` and `excerpt` stay hidden until the question is answered.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub question: String,
    pub category: String,
    pub choices: Vec<ChoiceView>,
    /// False once an answer is recorded.
    pub interactive: bool,
    pub selected: Option<String>,
    pub correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// Response body for the quiz view and a finished generation round.
#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    pub phase: Phase,
    pub epoch: u64,
    pub error: Option<String>,
    pub generated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub progress: Progress,
    pub categories: Vec<String>,
    pub category: String,
    pub questions: Vec<QuestionView>,
    pub seen_questions: Vec<String>,
}

/// Response body for an answer submission.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    /// False when the question had already been answered.
    pub recorded: bool,
    pub correct: bool,
    pub question: QuestionView,
    pub progress: Progress,
}
