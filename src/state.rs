use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{services::generator::QuestionSource, session::QuizSession};

/// Shared handler state: the single in-memory session and the generation service.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<QuizSession>>,
    pub source: Arc<dyn QuestionSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            session: Arc::new(Mutex::new(QuizSession::new())),
            source,
        }
    }
}
