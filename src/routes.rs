// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers::quiz, state::AppState};

/// Assembles the main application router.
///
/// * Mounts the quiz routes under `/api/quiz`.
/// * Applies global middleware (Trace, CORS).
/// * Injects the shared session state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/", get(quiz::get_quiz))
        .route("/generate", post(quiz::generate_quiz))
        .route("/answer", post(quiz::answer_question))
        .route("/categories", get(quiz::list_categories))
        .route("/progress", get(quiz::get_progress));

    Router::new()
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    use super::*;
    use crate::{error::GenerationError, services::generator::QuestionSource};

    struct Unreachable;

    #[async_trait]
    impl QuestionSource for Unreachable {
        async fn complete(&self, _api_key: &str, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Transport("offline".to_string()))
        }
    }

    fn app() -> Router {
        create_router(AppState::new(Arc::new(Unreachable)))
    }

    #[tokio::test]
    async fn test_progress_starts_empty() {
        let response = app()
            .oneshot(Request::get("/api/quiz/progress").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = app()
            .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
