// src/web/types.rs
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::ContentType;
use rocket::response::{self, Responder};
use rocket::serde::{Deserialize, Serialize};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rocket::{Request, Response};

use crate::assessment::ProfileImage;
use crate::errors::{ClientError, ExportError, ValidationError};

/// Characters kept as-is in an RFC 5987 `filename*` value
const FILENAME_ENCODE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

pub struct PdfResponse {
    pub data: Vec<u8>,
    pub filename: Option<String>,
}

impl PdfResponse {
    pub fn with_filename(data: Vec<u8>, filename: String) -> Self {
        Self {
            data,
            filename: Some(filename),
        }
    }
}

impl<'r> Responder<'r, 'static> for PdfResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut binding = Response::build();
        let mut response = binding
            .header(ContentType::PDF)
            .sized_body(self.data.len(), std::io::Cursor::new(self.data));

        if let Some(filename) = self.filename {
            response = response.raw_header("Content-Disposition", content_disposition(&filename));
        }

        response.ok()
    }
}

/// Plain `filename` for ASCII names. Anything else gets an ASCII fallback
/// plus the UTF-8 `filename*` form.
pub fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(filename, FILENAME_ENCODE)
    )
}

/// Draft screenshot for the form preview
pub struct ImageResponse(pub ProfileImage);

impl<'r> Responder<'r, 'static> for ImageResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let content_type =
            ContentType::parse_flexible(&self.0.mime_type).unwrap_or(ContentType::Binary);
        let data = self.0.data;

        Response::build()
            .header(content_type)
            .raw_header("Cache-Control", "no-store")
            .sized_body(data.len(), std::io::Cursor::new(data))
            .ok()
    }
}

/// Multipart body of the page form. The same form drives `/assess` and the
/// screenshot buttons.
#[derive(FromForm)]
pub struct AssessForm<'f> {
    #[field(default = String::new())]
    pub profile_url: String,
    pub screenshot: Option<TempFile<'f>>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApiImage {
    pub mime_type: String,
    /// base64, standard alphabet
    pub data: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApiAssessRequest {
    #[serde(default)]
    pub profile_url: String,
    pub image: Option<ApiImage>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthData {
    pub status: &'static str,
    pub version: &'static str,
    pub sessions: usize,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Error,
}

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }

    pub fn busy(conversation_id: Option<String>) -> Self {
        Self::new(
            "Another operation is already running for this session".to_string(),
            "SESSION_BUSY".to_string(),
            vec!["Wait for the current assessment or export to finish".to_string()],
            conversation_id,
        )
    }

    pub fn from_validation(error: &ValidationError, conversation_id: Option<String>) -> Self {
        Self::new(
            error.to_string(),
            error.code().to_string(),
            error.suggestions(),
            conversation_id,
        )
    }

    /// Transport details stay in the log; the user sees the generic message
    pub fn from_client(error: &ClientError, conversation_id: Option<String>) -> Self {
        let suggestions = match error {
            ClientError::Timeout(_) => vec!["Try again in a few moments".to_string()],
            ClientError::Cancelled => vec![],
            _ => vec![
                "Check that the profile is public".to_string(),
                "Upload a screenshot of the profile instead".to_string(),
            ],
        };
        Self::new(
            crate::errors::ANALYSIS_FAILED_MESSAGE.to_string(),
            error.code().to_string(),
            suggestions,
            conversation_id,
        )
    }

    pub fn from_export(error: &ExportError) -> Self {
        Self::new(
            "Failed to generate PDF".to_string(),
            error.code().to_string(),
            vec!["Try again in a few moments".to_string()],
            None,
        )
    }
}
