// src/services/mod.rs

pub mod evaluator;
pub mod generator;
pub mod parser;
pub mod prompt;
