// src/web/handlers/page_handlers.rs
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::{CookieJar, Status};
use rocket::response::content::RawHtml;
use rocket::response::status;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::State;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use crate::assessment::ProfileImage;
use crate::errors::ValidationError;
use crate::image_validator::{ImageValidationError, ImageValidator};
use crate::render::html::{render_page, RESULT_SECTION_ID};
use crate::session::{ExportOutcome, SubmitOutcome};
use crate::web::session_cookie::session_for;
use crate::web::types::*;
use crate::web::WebState;

pub async fn index_handler(jar: &CookieJar<'_>, state: &State<WebState>) -> RawHtml<String> {
    let session = session_for(jar, &state.sessions).await;
    RawHtml(render_page(&session.view().await))
}

pub async fn assess_handler(
    form: Form<AssessForm<'_>>,
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    let session = session_for(jar, &state.sessions).await;

    let image = match read_screenshot(form.screenshot.as_ref()).await {
        Ok(image) => image,
        Err(e) => {
            warn!("Screenshot rejected: {}", e.message);
            session
                .reject(&form.profile_url, ValidationError::Image(e))
                .await;
            return Redirect::to("/");
        }
    };

    match session.submit(&form.profile_url, image).await {
        SubmitOutcome::Completed(result) => {
            info!("Assessment ready for {}", result.display_name())
        }
        SubmitOutcome::Rejected(e) => info!("Submit rejected: {}", e),
        SubmitOutcome::Failed(e) => info!("Submit failed with {}", e.code()),
        SubmitOutcome::Ignored => {}
    }

    if session.take_scroll_request().await {
        Redirect::to(format!("/#{}", RESULT_SECTION_ID))
    } else {
        Redirect::to("/")
    }
}

pub async fn attach_screenshot_handler(
    form: Form<AssessForm<'_>>,
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    let session = session_for(jar, &state.sessions).await;
    session.set_draft_url(&form.profile_url).await;

    match read_screenshot(form.screenshot.as_ref()).await {
        Ok(Some(image)) => {
            session.attach_image(image).await;
        }
        Ok(None) => {}
        Err(e) => {
            session
                .reject(&form.profile_url, ValidationError::Image(e))
                .await;
        }
    }
    Redirect::to("/")
}

pub async fn screenshot_preview_handler(
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Option<ImageResponse> {
    let session = session_for(jar, &state.sessions).await;
    session.view().await.draft.image.map(ImageResponse)
}

pub async fn remove_screenshot_handler(
    form: Form<AssessForm<'_>>,
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Redirect {
    let session = session_for(jar, &state.sessions).await;
    session.set_draft_url(&form.profile_url).await;
    session.clear_image().await;
    Redirect::to("/")
}

pub async fn reset_handler(jar: &CookieJar<'_>, state: &State<WebState>) -> Redirect {
    let session = session_for(jar, &state.sessions).await;
    if !session.reset().await {
        warn!("Reset refused while an operation is running");
    }
    Redirect::to("/")
}

pub async fn export_handler(
    jar: &CookieJar<'_>,
    state: &State<WebState>,
) -> Result<PdfResponse, status::Custom<Json<StandardErrorResponse>>> {
    let session = session_for(jar, &state.sessions).await;

    match session.export_requested(state.exporter.clone()).await {
        ExportOutcome::Completed(document) => {
            info!(
                "Serving {} ({} bytes)",
                document.filename,
                document.bytes.len()
            );
            Ok(PdfResponse::with_filename(document.bytes, document.filename))
        }
        ExportOutcome::Failed(e) => Err(status::Custom(
            Status::InternalServerError,
            Json(StandardErrorResponse::from_export(&e)),
        )),
        ExportOutcome::Ignored => Err(status::Custom(
            Status::Conflict,
            Json(StandardErrorResponse::new(
                "No results to export".to_string(),
                "EXPORT_UNAVAILABLE".to_string(),
                vec!["Run an assessment first".to_string()],
                None,
            )),
        )),
    }
}

/// Empty file inputs come through as a zero-length part
async fn read_screenshot(
    file: Option<&TempFile<'_>>,
) -> Result<Option<ProfileImage>, ImageValidationError> {
    let Some(file) = file.filter(|f| f.len() > 0) else {
        return Ok(None);
    };

    let mut reader = Box::pin(file.open().await.map_err(ImageValidationError::unreadable)?);
    let mut data = Vec::with_capacity(file.len() as usize);
    reader
        .read_to_end(&mut data)
        .await
        .map_err(ImageValidationError::unreadable)?;

    ImageValidator::validate(data).map(Some)
}
