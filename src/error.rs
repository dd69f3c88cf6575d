// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::parser::ParseFailure;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., a round is already generating)
    Conflict(String),

    // 502 Bad Gateway (generation service failed or sent unusable output)
    BadGateway(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Why a generation round produced no question set.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The service call could not complete (network, auth, HTTP status).
    Transport(String),
    /// The service answered without any usable content.
    EmptyResponse,
    /// The content could not be read as a question array.
    Parse(ParseFailure),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Transport(reason) => {
                write!(f, "Failed to generate questions: {}", reason)
            }
            GenerationError::EmptyResponse => {
                write!(f, "Failed to generate questions: the service returned no content")
            }
            GenerationError::Parse(failure) => {
                write!(f, "Could not read questions from the generated output: {}", failure)
            }
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<ParseFailure> for GenerationError {
    fn from(failure: ParseFailure) -> Self {
        GenerationError::Parse(failure)
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Transport(err.to_string())
    }
}

/// Generation failures surface to the client as 502 with the user-facing message.
impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::BadGateway(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_messages_include_reason() {
        let transport = GenerationError::Transport("401 Unauthorized".to_string());
        assert!(transport.to_string().contains("401 Unauthorized"));

        let parse = GenerationError::from(ParseFailure::NoArrayDelimiters);
        assert!(parse.to_string().contains("no JSON array"));
    }

    #[test]
    fn test_generation_error_maps_to_bad_gateway() {
        let response = AppError::from(GenerationError::EmptyResponse).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_error_is_masked() {
        let response = AppError::InternalServerError("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
