// src/web/handlers/api_handlers.rs
use rocket::http::{CookieJar, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

use crate::assessment::AssessmentResult;
use crate::errors::ValidationError;
use crate::image_validator::ImageValidator;
use crate::session::{SessionSnapshot, SubmitOutcome};
use crate::web::session_cookie::session_for;
use crate::web::types::*;
use crate::web::WebState;

pub type ApiError = status::Custom<Json<StandardErrorResponse>>;

pub async fn api_assess_handler(
    request: Json<ApiAssessRequest>,
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Result<Json<DataResponse<AssessmentResult>>, ApiError> {
    let request = request.into_inner();
    let conversation_id = request.conversation_id.clone();
    let session = session_for(jar, &state.sessions).await;

    let image = match request.image {
        Some(image) => match ImageValidator::decode_base64(&image.data) {
            Ok(decoded) => {
                if decoded.mime_type != image.mime_type {
                    warn!(
                        "Declared {} but content is {}",
                        image.mime_type, decoded.mime_type
                    );
                }
                Some(decoded)
            }
            Err(e) => {
                let error = ValidationError::Image(e);
                let body = StandardErrorResponse::from_validation(&error, conversation_id);
                session.reject(&request.profile_url, error).await;
                return Err(status::Custom(Status::UnprocessableEntity, Json(body)));
            }
        },
        None => None,
    };

    match session.submit(&request.profile_url, image).await {
        SubmitOutcome::Completed(result) => {
            // the JSON client renders by itself; no pending scroll
            session.take_scroll_request().await;
            info!("API assessment ready for {}", result.display_name());
            Ok(Json(DataResponse::success(
                format!("Assessment complete for {}", result.display_name()),
                result,
                conversation_id,
            )))
        }
        SubmitOutcome::Rejected(e) => Err(status::Custom(
            Status::UnprocessableEntity,
            Json(StandardErrorResponse::from_validation(&e, conversation_id)),
        )),
        SubmitOutcome::Failed(e) => Err(status::Custom(
            Status::BadGateway,
            Json(StandardErrorResponse::from_client(&e, conversation_id)),
        )),
        SubmitOutcome::Ignored => Err(status::Custom(
            Status::Conflict,
            Json(StandardErrorResponse::busy(conversation_id)),
        )),
    }
}

pub async fn api_session_handler(
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Json<DataResponse<SessionSnapshot>> {
    let session = session_for(jar, &state.sessions).await;
    let snapshot = session.view().await.snapshot();
    Json(DataResponse::success(
        "Session state".to_string(),
        snapshot,
        None,
    ))
}

pub async fn api_reset_handler(
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Result<Json<TextResponse>, ApiError> {
    let session = session_for(jar, &state.sessions).await;
    if session.reset().await {
        Ok(Json(TextResponse::success("Session reset".to_string(), None)))
    } else {
        Err(status::Custom(
            Status::Conflict,
            Json(StandardErrorResponse::busy(None)),
        ))
    }
}

pub async fn health_handler(state: &State<WebState>) -> Json<DataResponse<HealthData>> {
    Json(DataResponse::success(
        "OK".to_string(),
        HealthData {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            sessions: state.sessions.len().await,
        },
        None,
    ))
}
