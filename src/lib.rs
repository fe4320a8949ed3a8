pub mod assessment;
pub mod cli;
pub mod config;
pub mod errors;
pub mod export;
pub mod image_validator;
pub mod render;
pub mod session;
pub mod validator;
pub mod web;

pub use assessment::{AssessmentResult, AssessmentService, GeminiClient, GeminiConfig};
pub use config::AppConfig;
pub use web::{build_rocket, start_web_server, WebState};
