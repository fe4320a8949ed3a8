// src/web/mod.rs
pub mod handlers;
pub mod session_cookie;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{CookieJar, Header, Status};
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::info;

use crate::assessment::{AssessmentResult, AssessmentService, GeminiClient};
use crate::config::AppConfig;
use crate::export::{Exporter, TypstRenderer};
use crate::session::{SessionSnapshot, SessionStore};
use handlers::ApiError;

pub struct WebState {
    pub sessions: SessionStore,
    pub exporter: Arc<Exporter>,
}

impl WebState {
    pub fn new(sessions: SessionStore, exporter: Exporter) -> Self {
        Self {
            sessions,
            exporter: Arc::new(exporter),
        }
    }
}

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        // credentialed requests cannot use the `*` wildcard, so the origin is echoed
        let Some(origin) = request.headers().get_one("Origin") else {
            return;
        };

        response.set_header(Header::new(
            "Access-Control-Allow-Origin",
            origin.to_string(),
        ));
        response.set_header(Header::new("Vary", "Origin"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Page routes

#[get("/")]
pub async fn index(jar: &CookieJar<'_>, state: &State<WebState>) -> RawHtml<String> {
    handlers::index_handler(jar, state).await
}

#[post("/assess", data = "<form>")]
pub async fn assess(
    form: Form<AssessForm<'_>>,
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    handlers::assess_handler(form, jar, state).await
}

#[post("/screenshot", data = "<form>")]
pub async fn attach_screenshot(
    form: Form<AssessForm<'_>>,
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    handlers::attach_screenshot_handler(form, jar, state).await
}

#[get("/screenshot")]
pub async fn screenshot_preview(
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Option<ImageResponse> {
    handlers::screenshot_preview_handler(jar, state).await
}

#[post("/screenshot/remove", data = "<form>")]
pub async fn remove_screenshot(
    form: Form<AssessForm<'_>>,
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    handlers::remove_screenshot_handler(form, jar, state).await
}

#[post("/reset")]
pub async fn reset(jar: &CookieJar<'_>, state: &State<WebState>) -> Redirect {
    handlers::reset_handler(jar, state).await
}

#[get("/export")]
pub async fn export_report(
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Result<PdfResponse, ApiError> {
    handlers::export_handler(jar, state).await
}

// JSON API

#[post("/assess", data = "<request>")]
pub async fn api_assess(
    request: Json<ApiAssessRequest>,
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Result<Json<DataResponse<AssessmentResult>>, ApiError> {
    handlers::api_assess_handler(request, jar, state).await
}

#[get("/session")]
pub async fn api_session(
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Json<DataResponse<SessionSnapshot>> {
    handlers::api_session_handler(jar, state).await
}

#[post("/reset")]
pub async fn api_reset(
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Result<Json<TextResponse>, ApiError> {
    handlers::api_reset_handler(jar, state).await
}

#[get("/health")]
pub async fn health(state: &State<WebState>) -> Json<DataResponse<HealthData>> {
    handlers::health_handler(state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(413)]
pub fn payload_too_large() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request too large".to_string(),
        "PAYLOAD_TOO_LARGE".to_string(),
        vec!["Screenshots must be 10MB or smaller".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "BAD_REQUEST".to_string(),
        vec!["Send a JSON object with a profile_url field".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Assemble the server around already-built state. Tests inject fakes here.
pub fn build_rocket(state: WebState, port: u16) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("file", 11.mebibytes())
        .limit("data-form", 12.mebibytes())
        .limit("json", 16.mebibytes());

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("limits", limits));

    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![bad_request, payload_too_large, unprocessable, internal_error],
        )
        .mount(
            "/",
            routes![
                index,
                assess,
                attach_screenshot,
                screenshot_preview,
                remove_screenshot,
                reset,
                export_report
            ],
        )
        .mount(
            "/api",
            routes![api_assess, api_session, api_reset, health, options],
        )
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    let client = GeminiClient::new(config.gemini.clone())?;
    let service: Arc<dyn AssessmentService> = Arc::new(client);

    let state = WebState::new(
        SessionStore::new(service, config.host_matching),
        Exporter::new(
            Box::new(
                TypstRenderer::new(config.typst_bin.clone()).with_timeout(config.export_timeout),
            ),
            config.report_prefix.clone(),
        ),
    );

    info!("Starting career risk server on port {}", config.port);
    info!("Model: {} at {}", config.gemini.model, config.gemini.api_url);

    let _rocket = build_rocket(state, config.port).launch().await?;

    Ok(())
}
