// src/errors.rs
//! Error taxonomy shared by the controller, the web layer and the CLI

use std::time::Duration;
use thiserror::Error;

use crate::image_validator::ImageValidationError;

/// Message shown inline whenever the analysis call fails, whatever the cause.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Analysis failed. The profile might be private or unreachable. Try uploading a screenshot.";

#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Please enter a LinkedIn profile URL.")]
    EmptyUrl,
    #[error("Please enter a valid LinkedIn URL.")]
    InvalidUrl,
    #[error("{}", .0.message)]
    Image(ImageValidationError),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyUrl | Self::InvalidUrl => "VALIDATION_ERROR",
            Self::Image(e) => e.error_type.code(),
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyUrl | Self::InvalidUrl => vec![
                "Use a profile address like https://www.linkedin.com/in/your-profile".to_string(),
            ],
            Self::Image(e) => vec![e.suggestion.clone()],
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("analysis service unreachable: {0}")]
    Unreachable(String),
    #[error("analysis service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("analysis service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("analysis was cancelled")]
    Cancelled,
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "SERVICE_UNREACHABLE",
            Self::Service { .. } => "SERVICE_ERROR",
            Self::Timeout(_) => "SERVICE_TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }
}

#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error("failed to render report: {0}")]
    Render(String),
    #[error("document toolchain unavailable: {0}")]
    Toolchain(String),
    #[error("export i/o failure: {0}")]
    Io(String),
}

impl ExportError {
    pub fn code(&self) -> &'static str {
        "EXPORT_ERROR"
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY (or API_KEY) environment variable not set")]
    MissingApiKey,
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },
}
