// src/web/session_cookie.rs
use rocket::http::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::session::{SessionController, SessionStore};

pub const SESSION_COOKIE: &str = "career_risk_session";

pub fn session_id(jar: &CookieJar<'_>) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Session bound to the browser cookie. Issues a new cookie when the old one
/// is missing or has expired server-side.
pub async fn session_for(jar: &CookieJar<'_>, store: &SessionStore) -> Arc<SessionController> {
    let known = session_id(jar);
    let (id, controller) = store.get_or_create(known).await;

    if known != Some(id) {
        info!("Starting session {}", id);
        jar.add(
            Cookie::build((SESSION_COOKIE, id.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        );
    }

    controller
}
