#![allow(dead_code)]

use async_trait::async_trait;
use career_risk::assessment::{AssessmentRequest, AssessmentResult, AssessmentService};
use career_risk::errors::{ClientError, ExportError};
use career_risk::export::{DocumentRenderer, Exporter};
use career_risk::session::SessionStore;
use career_risk::validator::HostMatching;
use career_risk::{build_rocket, WebState};
use rocket::local::asynchronous::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub const FIXTURE: &str = include_str!("../fixtures/assessment.json");
pub const PROFILE_URL: &str = "https://www.linkedin.com/in/ada-lovelace";

pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
];

pub fn sample_result() -> AssessmentResult {
    serde_json::from_str(FIXTURE).expect("fixture is a valid assessment")
}

/// Records every request and answers with a canned outcome
pub struct FakeService {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<AssessmentRequest>>,
    response: Result<AssessmentResult, ClientError>,
}

impl FakeService {
    pub fn ok() -> Arc<Self> {
        Self::with_response(Ok(sample_result()))
    }

    pub fn failing(error: ClientError) -> Arc<Self> {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<AssessmentResult, ClientError>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            response,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<AssessmentRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AssessmentService for FakeService {
    async fn analyze(
        &self,
        request: &AssessmentRequest,
        _cancel: &CancellationToken,
    ) -> Result<AssessmentResult, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.response.clone()
    }
}

pub struct StaticRenderer(pub Result<Vec<u8>, String>);

#[async_trait]
impl DocumentRenderer for StaticRenderer {
    async fn render(&self, _source: &str) -> Result<Vec<u8>, ExportError> {
        self.0.clone().map_err(ExportError::Render)
    }
}

pub fn pdf_renderer() -> StaticRenderer {
    StaticRenderer(Ok(b"%PDF-1.7 fake".to_vec()))
}

pub async fn client_with(service: Arc<FakeService>, renderer: StaticRenderer) -> Client {
    let state = WebState::new(
        SessionStore::new(service, HostMatching::Substring),
        Exporter::new(Box::new(renderer), "AI-Risk-Assessment"),
    );
    Client::tracked(build_rocket(state, 0))
        .await
        .expect("valid rocket instance")
}

pub async fn client(service: Arc<FakeService>) -> Client {
    client_with(service, pdf_renderer()).await
}

/// `application/x-www-form-urlencoded` body for the page form
pub fn form_body(profile_url: &str) -> String {
    format!("profile_url={}", urlencode(profile_url))
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub const BOUNDARY: &str = "X-CAREER-RISK-BOUNDARY";

/// Multipart body with a URL field and a screenshot file part
pub fn multipart_body(profile_url: &str, screenshot: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"profile_url\"\r\n\r\n{url}\r\n",
            b = BOUNDARY,
            url = profile_url
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"screenshot\"; filename=\"profile.png\"\r\nContent-Type: image/png\r\n\r\n",
            b = BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(screenshot);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}
