// src/assessment/client.rs
//! Gemini `generateContent` client: one schema-constrained call per assessment

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use super::schema::response_schema;
use super::types::{AssessmentRequest, AssessmentResult};
use crate::errors::ClientError;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_SEED: i64 = 42;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const JSON_MIME: &str = "application/json";

#[async_trait]
pub trait AssessmentService: Send + Sync {
    async fn analyze(
        &self,
        request: &AssessmentRequest,
        cancel: &CancellationToken,
    ) -> Result<AssessmentResult, ClientError>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
    pub seed: i64,
    pub grounded_search: bool,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            seed: DEFAULT_SEED,
            grounded_search: true,
        }
    }
}

// ===== Wire types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleSearch {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub seed: i64,
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    status: Option<String>,
}

// ===== Client =====

pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Request body for one profile: inline screenshot first, then the instruction text.
    pub fn build_request(&self, request: &AssessmentRequest) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);

        if let Some(image) = &request.image {
            parts.push(Part {
                inline_data: Some(Blob {
                    mime_type: image.mime_type.clone(),
                    data: STANDARD.encode(&image.data),
                }),
                text: None,
            });
        }

        parts.push(Part::text(build_prompt(
            &request.profile_url,
            request.image.is_some(),
        )));

        let tools = if self.config.grounded_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(SYSTEM_INSTRUCTION)],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            tools,
            generation_config: GenerationConfig {
                temperature: 0.0,
                seed: self.config.seed,
                response_mime_type: JSON_MIME.to_string(),
                response_schema: response_schema(),
            },
        }
    }

    async fn send(&self, body: &GenerateContentRequest) -> Result<String, ClientError> {
        let url = self.endpoint();
        info!("Calling generation service: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("Generation service request failed: {}", e);
                ClientError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ClientError::Unreachable(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorEnvelope>(&response_text) {
                Ok(envelope) => match envelope.error.status {
                    Some(code) => format!("{} ({})", envelope.error.message, code),
                    None => envelope.error.message,
                },
                Err(_) => response_text,
            };
            error!("Generation service error {}: {}", status, message);
            return Err(ClientError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response_text)
    }
}

#[async_trait]
impl AssessmentService for GeminiClient {
    async fn analyze(
        &self,
        request: &AssessmentRequest,
        cancel: &CancellationToken,
    ) -> Result<AssessmentResult, ClientError> {
        let body = self.build_request(request);
        let timeout = self.config.timeout;

        let response_text = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("Assessment for {} cancelled", request.profile_url);
                return Err(ClientError::Cancelled);
            }
            outcome = tokio::time::timeout(timeout, self.send(&body)) => match outcome {
                Ok(result) => result?,
                Err(_) => {
                    error!("Generation service timed out after {:?}", timeout);
                    return Err(ClientError::Timeout(timeout));
                }
            },
        };

        let result = extract_result(&response_text)?;
        info!(
            "Assessment received: {} risk ({}/100)",
            result.overall_risk, result.risk_score
        );
        Ok(result)
    }
}

/// Pulls the model's JSON text out of a `generateContent` response body and parses it.
pub fn extract_result(response_body: &str) -> Result<AssessmentResult, ClientError> {
    let response: GenerateContentResponse = serde_json::from_str(response_body)
        .map_err(|e| ClientError::MalformedResponse(format!("invalid response envelope: {}", e)))?;

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(ClientError::MalformedResponse(format!(
            "prompt blocked: {}",
            reason
        )));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::MalformedResponse("response has no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ClientError::MalformedResponse(format!(
            "candidate has no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    parse_assessment(&text)
}

/// Parses the JSON document the model produced into an [`AssessmentResult`].
pub fn parse_assessment(text: &str) -> Result<AssessmentResult, ClientError> {
    let json = strip_code_fence(text);

    let result: AssessmentResult = serde_json::from_str(json)
        .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

    result
        .check_contract()
        .map_err(ClientError::MalformedResponse)?;

    Ok(result)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}
