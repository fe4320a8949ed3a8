// src/image_validator.rs
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

use crate::assessment::ProfileImage;

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const GIF_SIGNATURE: &[u8] = b"GIF8";

/// Max screenshot size (10MB), well under the inline-data limit of the model API
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ImageValidationError {
    pub error_type: ImageErrorType,
    pub message: String,
    pub suggestion: String,
}

impl ImageValidationError {
    pub fn unreadable(reason: impl std::fmt::Display) -> Self {
        Self {
            error_type: ImageErrorType::UnreadableFile,
            message: format!("Cannot read screenshot: {}", reason),
            suggestion: "Check the file and try uploading it again".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageErrorType {
    EmptyFile,
    TooLarge,
    WrongFormat,
    UnreadableFile,
}

impl ImageErrorType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyFile => "IMAGE_EMPTY",
            Self::TooLarge => "IMAGE_TOO_LARGE",
            Self::WrongFormat => "IMAGE_WRONG_FORMAT",
            Self::UnreadableFile => "IMAGE_UNREADABLE",
        }
    }
}

pub struct ImageValidator;

impl ImageValidator {
    /// Validate screenshot bytes and detect their MIME type from the header
    pub fn validate(data: Vec<u8>) -> Result<ProfileImage, ImageValidationError> {
        if data.is_empty() {
            return Err(ImageValidationError {
                error_type: ImageErrorType::EmptyFile,
                message: "Screenshot file is empty".to_string(),
                suggestion: "Please upload a valid image file".to_string(),
            });
        }

        if data.len() > MAX_IMAGE_SIZE {
            return Err(ImageValidationError {
                error_type: ImageErrorType::TooLarge,
                message: format!(
                    "Screenshot too large: {:.1}MB (max 10MB)",
                    data.len() as f64 / 1024.0 / 1024.0
                ),
                suggestion: "Please crop or compress your screenshot and try again".to_string(),
            });
        }

        let mime_type = Self::sniff_mime(&data).ok_or_else(|| ImageValidationError {
            error_type: ImageErrorType::WrongFormat,
            message: "Unsupported image format".to_string(),
            suggestion: "Please use PNG, JPEG, WEBP or GIF".to_string(),
        })?;

        Ok(ProfileImage {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// Read an uploaded file to completion, then validate it
    pub async fn read_upload(path: &Path) -> Result<ProfileImage, ImageValidationError> {
        let data = fs::read(path).await.map_err(|e| {
            error!("Cannot read uploaded screenshot {}: {}", path.display(), e);
            ImageValidationError::unreadable(e)
        })?;

        let image = Self::validate(data)?;
        info!(
            "Screenshot accepted: {} ({} bytes)",
            image.mime_type,
            image.data.len()
        );
        Ok(image)
    }

    /// Screenshots sent through the JSON API arrive base64 encoded
    pub fn decode_base64(encoded: &str) -> Result<ProfileImage, ImageValidationError> {
        let data = STANDARD
            .decode(encoded.trim())
            .map_err(ImageValidationError::unreadable)?;
        Self::validate(data)
    }

    fn sniff_mime(header: &[u8]) -> Option<&'static str> {
        if header.starts_with(PNG_SIGNATURE) {
            Some("image/png")
        } else if header.starts_with(JPEG_SIGNATURE) {
            Some("image/jpeg")
        } else if header.starts_with(GIF_SIGNATURE) {
            Some("image/gif")
        } else if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
            Some("image/webp")
        } else {
            None
        }
    }
}
