// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::{AppError, GenerationError},
    models::quiz::{AnswerRequest, AnswerResponse, GenerateRequest, QuizQuery},
    session::RoundOutcome,
    state::AppState,
};

/// Runs one generation round and returns the new quiz.
///
/// * Rejects blank credentials or text and counts outside 1..=20 (400).
/// * Rejects a second round while one is in flight (409).
/// * Transport or parse failures leave the session `failed` (502).
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let round = state
        .session
        .lock()
        .await
        .start_generation(&req.text, req.count)?;

    let epoch = round.epoch;
    let session = state.session.clone();
    let source = state.source.clone();
    let api_key = req.api_key;

    // Detached so the round still resolves if the client goes away mid-call.
    let task = tokio::spawn(async move {
        let response = source.complete(&api_key, &round.prompt).await;
        session.lock().await.finish_generation(round.epoch, response)
    });

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            // The task died before resolving the round; fail it so a retry is possible.
            tracing::error!("Generation task failed: {:?}", e);
            state.session.lock().await.finish_generation(
                epoch,
                Err(GenerationError::Transport("the generation call was aborted".to_string())),
            )
        }
    };

    match outcome {
        RoundOutcome::Installed(_) => Ok(Json(state.session.lock().await.view(None))),
        RoundOutcome::Failed(err) => Err(err.into()),
        RoundOutcome::Stale => Err(AppError::Conflict(
            "Generation round was superseded".to_string(),
        )),
    }
}

/// Returns the current quiz, optionally narrowed to one category.
pub async fn get_quiz(
    State(state): State<AppState>,
    Query(query): Query<QuizQuery>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    Ok(Json(session.view(query.category.as_deref())))
}

/// Records an answer for one question.
/// Answering an already answered question changes nothing and reports `recorded: false`.
pub async fn answer_question(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.session.lock().await;
    let outcome = session.answer(req.index, &req.letter)?;

    let question = session
        .question_view(req.index)
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", req.index)))?;

    Ok(Json(AnswerResponse {
        recorded: outcome.recorded,
        correct: outcome.correct,
        question,
        progress: session.progress(),
    }))
}

/// Lists the category filter options, "All" first.
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    Ok(Json(session.category_filters()))
}

pub async fn get_progress(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    Ok(Json(session.progress()))
}
