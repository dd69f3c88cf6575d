// src/services/evaluator.rs

use serde::Serialize;

use crate::models::question::{Question, label_position};

/// How one option of a question is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceState {
    /// Not chosen, or not yet graded.
    Neutral,
    CorrectChosen,
    IncorrectChosen,
    /// The right option when the user picked a different one.
    CorrectUnchosen,
}

/// Case-insensitive comparison of a submitted label with the question's answer.
///
/// A missing or blank submission is never correct. Grading uses the
/// resolved answer, so a claimed letter past the last choice cannot win.
pub fn is_correct(question: &Question, submitted: Option<&str>) -> bool {
    let submitted = match submitted.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return false,
    };
    let expected = question.resolved_answer();

    !expected.is_empty() && submitted.to_uppercase() == expected.to_uppercase()
}

/// Display state of every reachable choice, given the recorded selection (if any).
pub fn choice_states(question: &Question, selected: Option<&str>) -> Vec<ChoiceState> {
    let reachable = question.labels().len();
    let mut states = vec![ChoiceState::Neutral; reachable];

    let Some(selected) = selected else {
        return states;
    };
    let Some(chosen) = label_position(selected).filter(|&pos| pos < reachable) else {
        return states;
    };

    if is_correct(question, Some(selected)) {
        states[chosen] = ChoiceState::CorrectChosen;
    } else {
        states[chosen] = ChoiceState::IncorrectChosen;
        if let Some(right) = question.answer_position().filter(|&pos| pos < reachable) {
            states[right] = ChoiceState::CorrectUnchosen;
        }
    }

    states
}
