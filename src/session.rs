// src/session.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{
    config::ALL_CATEGORIES,
    error::{AppError, GenerationError},
    models::{
        question::{Question, label_position},
        quiz::{ChoiceView, Phase, Progress, QuestionView, QuizView},
    },
    services::{
        evaluator::{choice_states, is_correct},
        parser::parse_questions,
        prompt::build_prompt,
    },
};

/// A generation round that has been started but not yet resolved.
#[derive(Debug, Clone)]
pub struct PendingRound {
    pub epoch: u64,
    pub prompt: String,
}

/// What happened to a service response handed back to the session.
#[derive(Debug, PartialEq)]
pub enum RoundOutcome {
    /// The question set was installed; carries its size.
    Installed(usize),
    Failed(GenerationError),
    /// The response belonged to an older round and was dropped.
    Stale,
}

/// Result of an answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// False when the question already had an answer and nothing changed.
    pub recorded: bool,
    pub correct: bool,
}

/// In-memory quiz state for one user.
///
/// Questions are kept as an arena indexed by position; answers live in a
/// separate write-once map so the questions themselves never change.
#[derive(Debug)]
pub struct QuizSession {
    phase: Phase,
    epoch: u64,
    questions: Vec<Question>,
    answers: HashMap<usize, String>,
    seen_questions: Vec<String>,
    error: Option<String>,
    generated_at: Option<DateTime<Utc>>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            epoch: 0,
            questions: Vec::new(),
            answers: HashMap::new(),
            seen_questions: Vec::new(),
            error: None,
            generated_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn seen_questions(&self) -> &[String] {
        &self.seen_questions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The label recorded for a question, if it has been answered.
    pub fn selected(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    /// Opens a new round: clears every trace of the previous one and bumps the epoch.
    ///
    /// The prompt is always built without exclusions. `seen_questions` is
    /// tracked per round but does not feed into the next prompt.
    pub fn start_generation(&mut self, text: &str, count: u32) -> Result<PendingRound, AppError> {
        if self.phase == Phase::Generating {
            return Err(AppError::Conflict(
                "A question set is already being generated".to_string(),
            ));
        }

        self.questions.clear();
        self.answers.clear();
        self.seen_questions.clear();
        self.error = None;
        self.generated_at = None;
        self.epoch += 1;
        self.phase = Phase::Generating;

        tracing::info!(
            "Starting generation round {} ({} questions, {} chars of text)",
            self.epoch,
            count,
            text.len()
        );

        Ok(PendingRound {
            epoch: self.epoch,
            prompt: build_prompt(text, count, &[]),
        })
    }

    /// Applies the service response for round `epoch`.
    ///
    /// Responses from an older round are discarded without touching state.
    /// Transport and parse failures abort the whole round.
    pub fn finish_generation(
        &mut self,
        epoch: u64,
        response: Result<String, GenerationError>,
    ) -> RoundOutcome {
        if epoch != self.epoch || self.phase != Phase::Generating {
            tracing::debug!(
                "Discarding stale response for round {} (current round {})",
                epoch,
                self.epoch
            );
            return RoundOutcome::Stale;
        }

        let parsed = response.and_then(|raw| parse_questions(&raw).map_err(GenerationError::from));

        match parsed {
            Ok(questions) => {
                let count = questions.len();
                self.questions = questions;
                self.phase = Phase::Ready;
                self.generated_at = Some(Utc::now());
                tracing::info!("Round {} ready with {} questions", epoch, count);
                RoundOutcome::Installed(count)
            }
            Err(err) => {
                tracing::warn!("Round {} failed: {}", epoch, err);
                self.phase = Phase::Failed;
                self.error = Some(err.to_string());
                RoundOutcome::Failed(err)
            }
        }
    }

    /// Records the user's choice for question `index`. Write-once per question.
    pub fn answer(&mut self, index: usize, letter: &str) -> Result<AnswerOutcome, AppError> {
        if self.phase != Phase::Ready {
            return Err(AppError::Conflict("No question set is ready".to_string()));
        }

        let question = self
            .questions
            .get(index)
            .ok_or_else(|| AppError::NotFound(format!("Question {} not found", index)))?;

        if let Some(previous) = self.answers.get(&index) {
            return Ok(AnswerOutcome {
                recorded: false,
                correct: is_correct(question, Some(previous.as_str())),
            });
        }

        let letter = letter.trim().to_uppercase();
        let reachable = question.labels().len();
        if !label_position(&letter).is_some_and(|pos| pos < reachable) {
            return Err(AppError::BadRequest(format!(
                "'{}' is not a valid choice for question {}",
                letter, index
            )));
        }

        let correct = is_correct(question, Some(letter.as_str()));
        self.seen_questions.push(question.question.clone());
        self.answers.insert(index, letter);

        tracing::info!("Recorded answer for question {} (correct: {})", index, correct);

        Ok(AnswerOutcome {
            recorded: true,
            correct,
        })
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn correct_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|(index, letter)| {
                self.questions
                    .get(**index)
                    .is_some_and(|q| is_correct(q, Some(letter.as_str())))
            })
            .count()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.answered_count(),
            correct: self.correct_count(),
            total: self.questions.len(),
        }
    }

    /// Distinct categories of the current set, in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for question in &self.questions {
            if !categories.contains(&question.category) {
                categories.push(question.category.clone());
            }
        }
        categories
    }

    /// Filter options offered to the user: the "All" sentinel, then every category.
    pub fn category_filters(&self) -> Vec<String> {
        let mut filters = vec![ALL_CATEGORIES.to_string()];
        filters.extend(
            self.categories()
                .into_iter()
                .filter(|c| c != ALL_CATEGORIES),
        );
        filters
    }

    /// Questions in `category` paired with their positions; everything for "All" or no filter.
    pub fn filtered(&self, category: Option<&str>) -> Vec<(usize, &Question)> {
        let category = category.filter(|c| *c != ALL_CATEGORIES);
        self.questions
            .iter()
            .enumerate()
            .filter(|(_, q)| category.is_none_or(|c| q.category == c))
            .collect()
    }

    pub fn question_view(&self, index: usize) -> Option<QuestionView> {
        let question = self.questions.get(index)?;
        let selected = self.selected(index);
        let labels = question.labels();
        let states = choice_states(question, selected);

        let choices = labels
            .iter()
            .zip(question.choices.iter())
            .zip(states)
            .map(|((label, text), state)| ChoiceView {
                label: *label,
                text: text.clone(),
                state,
            })
            .collect();

        let revealed = selected.is_some();

        Some(QuestionView {
            index,
            question: question.question.clone(),
            category: question.category.clone(),
            choices,
            interactive: !revealed,
            selected: selected.map(str::to_string),
            correct: selected.map(|s| is_correct(question, Some(s))),
            answer: revealed.then(|| question.resolved_answer().to_string()),
            explanation: revealed.then(|| question.explanation.clone()),
            excerpt: revealed.then(|| question.excerpt.clone()),
        })
    }

    /// Snapshot of the session for clients, restricted to `category`.
    pub fn view(&self, category: Option<&str>) -> QuizView {
        let questions = self
            .filtered(category)
            .into_iter()
            .filter_map(|(index, _)| self.question_view(index))
            .collect();

        QuizView {
            phase: self.phase,
            epoch: self.epoch,
            error: self.error.clone(),
            generated_at: self.generated_at,
            progress: self.progress(),
            categories: self.category_filters(),
            category: category.unwrap_or(ALL_CATEGORIES).to_string(),
            questions,
            seen_questions: self.seen_questions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parser::ParseFailure;

    const THREE_QUESTIONS: &str = r#"Sure! Here are your questions:
[
  {"question": "What do mitochondria produce?", "choices": ["ATP", "DNA", "RNA", "Lipids"], "answer": "A", "category": "Cells"},
  {"question": "Where does photosynthesis occur?", "choices": ["Nucleus", "Chloroplast", "Ribosome", "Vacuole"], "answer": "B", "category": "Plants"},
  {"question": "What carries genetic code?", "choices": ["Starch", "Water", "DNA", "Salt"], "answer": "C", "category": "Cells"}
]"#;

    fn ready_session() -> QuizSession {
        let mut session = QuizSession::new();
        let round = session.start_generation("biology notes", 3).unwrap();
        let outcome = session.finish_generation(round.epoch, Ok(THREE_QUESTIONS.to_string()));
        assert_eq!(outcome, RoundOutcome::Installed(3));
        session
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = QuizSession::new();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.epoch(), 0);
        assert!(session.questions().is_empty());
    }

    #[test]
    fn test_start_generation_builds_prompt_without_exclusions() {
        let mut session = ready_session();
        session.answer(0, "A").unwrap();

        let round = session.start_generation("more notes", 4).unwrap();
        assert_eq!(round.epoch, 2);
        assert!(round.prompt.contains("exactly 4 unique"));
        assert!(!round.prompt.contains("already asked"));
    }

    #[test]
    fn test_start_rejected_while_generating() {
        let mut session = QuizSession::new();
        session.start_generation("notes", 3).unwrap();
        let second = session.start_generation("notes", 3);
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(session.epoch(), 1);
    }

    #[test]
    fn test_end_to_end_progress_and_categories() {
        let mut session = ready_session();

        let first = session.answer(0, "a").unwrap();
        assert_eq!(first, AnswerOutcome { recorded: true, correct: true });
        let second = session.answer(1, "C").unwrap();
        assert_eq!(second, AnswerOutcome { recorded: true, correct: false });

        assert_eq!(session.answered_count(), 2);
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.categories(), vec!["Cells", "Plants"]);
        assert_eq!(session.category_filters(), vec!["All", "Cells", "Plants"]);
    }

    #[test]
    fn test_answer_is_write_once() {
        let mut session = ready_session();
        session.answer(1, "B").unwrap();

        let repeat = session.answer(1, "D").unwrap();
        assert_eq!(repeat, AnswerOutcome { recorded: false, correct: true });
        assert_eq!(session.selected(1), Some("B"));
        assert_eq!(session.seen_questions(), ["Where does photosynthesis occur?"]);
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn test_answer_validation() {
        let mut session = ready_session();
        assert!(matches!(session.answer(9, "A"), Err(AppError::NotFound(_))));
        assert!(matches!(session.answer(0, "E"), Err(AppError::BadRequest(_))));
        assert!(matches!(session.answer(0, ""), Err(AppError::BadRequest(_))));
        assert_eq!(session.answered_count(), 0);
        assert!(session.seen_questions().is_empty());
    }

    #[test]
    fn test_answer_rejects_unreachable_label() {
        let mut session = QuizSession::new();
        let round = session.start_generation("notes", 1).unwrap();
        session.finish_generation(
            round.epoch,
            Ok(r#"[{"question": "Q", "choices": "only-one", "answer": "c"}]"#.to_string()),
        );

        assert!(matches!(session.answer(0, "B"), Err(AppError::BadRequest(_))));
        assert!(session.answer(0, "a").unwrap().correct);
    }

    #[test]
    fn test_answer_requires_ready_set() {
        let mut session = QuizSession::new();
        assert!(matches!(session.answer(0, "A"), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_new_round_clears_previous_state() {
        let mut session = ready_session();
        session.answer(0, "A").unwrap();
        session.answer(2, "C").unwrap();

        let round = session.start_generation("other notes", 2).unwrap();
        assert_eq!(session.phase(), Phase::Generating);
        assert!(session.questions().is_empty());
        assert!(session.seen_questions().is_empty());
        assert_eq!(session.answered_count(), 0);

        session.finish_generation(
            round.epoch,
            Ok(r#"[{"question": "New", "choices": ["a", "b"], "answer": "B"}]"#.to_string()),
        );
        assert_eq!(session.questions().len(), 1);
        assert_eq!(session.selected(0), None);
        assert_eq!(session.categories(), vec!["general"]);
    }

    #[test]
    fn test_parse_failure_moves_to_failed() {
        let mut session = QuizSession::new();
        let round = session.start_generation("notes", 3).unwrap();
        let outcome = session.finish_generation(round.epoch, Ok("I cannot help".to_string()));

        assert_eq!(
            outcome,
            RoundOutcome::Failed(GenerationError::Parse(ParseFailure::NoArrayDelimiters))
        );
        assert_eq!(session.phase(), Phase::Failed);
        assert!(session.error().unwrap().contains("no JSON array"));
        assert!(session.questions().is_empty());
    }

    #[test]
    fn test_transport_failure_moves_to_failed_and_allows_retry() {
        let mut session = QuizSession::new();
        let round = session.start_generation("notes", 3).unwrap();
        session.finish_generation(
            round.epoch,
            Err(GenerationError::Transport("connection refused".to_string())),
        );
        assert_eq!(session.phase(), Phase::Failed);
        assert!(session.error().unwrap().contains("connection refused"));

        let retry = session.start_generation("notes", 3).unwrap();
        assert_eq!(session.error(), None);
        session.finish_generation(retry.epoch, Ok(THREE_QUESTIONS.to_string()));
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = QuizSession::new();
        let old = session.start_generation("notes", 3).unwrap();
        session.finish_generation(old.epoch, Err(GenerationError::EmptyResponse));

        let current = session.start_generation("notes", 3).unwrap();
        let outcome = session.finish_generation(old.epoch, Ok(THREE_QUESTIONS.to_string()));
        assert_eq!(outcome, RoundOutcome::Stale);
        assert_eq!(session.phase(), Phase::Generating);
        assert!(session.questions().is_empty());

        let outcome = session.finish_generation(current.epoch, Ok(THREE_QUESTIONS.to_string()));
        assert_eq!(outcome, RoundOutcome::Installed(3));
    }

    #[test]
    fn test_filtered_keeps_positions() {
        let session = ready_session();

        let cells: Vec<usize> = session.filtered(Some("Cells")).into_iter().map(|(i, _)| i).collect();
        assert_eq!(cells, vec![0, 2]);
        assert_eq!(session.filtered(Some("All")).len(), 3);
        assert_eq!(session.filtered(None).len(), 3);
        assert!(session.filtered(Some("History")).is_empty());
    }

    #[test]
    fn test_question_view_hides_answer_until_answered() {
        let mut session = ready_session();

        let before = session.question_view(1).unwrap();
        assert!(before.interactive);
        assert_eq!(before.answer, None);
        assert_eq!(before.choices.len(), 4);

        session.answer(1, "A").unwrap();
        let after = session.question_view(1).unwrap();
        assert!(!after.interactive);
        assert_eq!(after.answer.as_deref(), Some("B"));
        assert_eq!(after.correct, Some(false));
        assert_eq!(after.choices[0].label, "A");
        assert_eq!(
            after.choices[0].state,
            crate::services::evaluator::ChoiceState::IncorrectChosen
        );
        assert_eq!(
            after.choices[1].state,
            crate::services::evaluator::ChoiceState::CorrectUnchosen
        );
    }

    #[test]
    fn test_view_reports_filter_and_progress() {
        let mut session = ready_session();
        session.answer(2, "C").unwrap();

        let view = session.view(Some("Cells"));
        assert_eq!(view.phase, Phase::Ready);
        assert_eq!(view.category, "Cells");
        assert_eq!(view.questions.len(), 2);
        assert_eq!(view.progress, Progress { answered: 1, correct: 1, total: 3 });
        assert_eq!(view.seen_questions, vec!["What carries genetic code?"]);
        assert!(view.generated_at.is_some());
    }
}
