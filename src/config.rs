// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Smallest number of questions a single round may request.
pub const MIN_QUESTION_COUNT: u32 = 1;
/// Largest number of questions a single round may request.
pub const MAX_QUESTION_COUNT: u32 = 20;

/// Category assigned to questions the model left uncategorised.
pub const DEFAULT_CATEGORY: &str = "general";
/// Sentinel category filter that selects every question.
pub const ALL_CATEGORIES: &str = "All";

/// Choice labels, in positional order.
pub const LABELS: [&str; 4] = ["A", "B", "C", "D"];

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the chat-completions compatible generation service.
    pub openai_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model = env::var("QUIZ_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let temperature = parse_or(env::var("QUIZ_TEMPERATURE").ok(), DEFAULT_TEMPERATURE);

        let port = parse_or(env::var("PORT").ok(), DEFAULT_PORT);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            openai_base_url,
            model,
            temperature,
            port,
            rust_log,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, fallback: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(fallback)
}
