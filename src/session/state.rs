// src/session/state.rs
use serde::Serialize;

use crate::assessment::{AssessmentResult, ProfileImage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Input,
    Analyzing,
    Results,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDraft {
    pub profile_url: String,
    pub image: Option<ProfileImage>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub mode: Mode,
    pub draft: RequestDraft,
    pub last_error: Option<String>,
    pub last_result: Option<AssessmentResult>,
    pub exporting: bool,
    /// results should be scrolled into view on next render
    pub scroll_to_results: bool,
}

impl ViewState {
    pub fn analyzing(&self) -> bool {
        self.mode == Mode::Analyzing
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            profile_url: self.draft.profile_url.clone(),
            image_mime_type: self.draft.image.as_ref().map(|i| i.mime_type.clone()),
            last_error: self.last_error.clone(),
            last_result: self.last_result.clone(),
            analyzing: self.analyzing(),
            exporting: self.exporting,
        }
    }
}

/// JSON view of a session for API clients
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub profile_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_result: Option<AssessmentResult>,
    pub analyzing: bool,
    pub exporting: bool,
}
