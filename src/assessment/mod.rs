// src/assessment/mod.rs
pub mod client;
pub mod prompt;
pub mod schema;
pub mod types;

pub use client::{AssessmentService, GeminiClient, GeminiConfig};
pub use types::*;
