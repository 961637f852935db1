//! CSRF token issuance.

use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /api/csrf`.
#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub token: String,
}

/// Issue a fresh token.
///
/// The raw token goes in the body for the client to echo in `x-csrf-token`;
/// the signed value goes in an httpOnly cookie.
pub async fn issue(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<CsrfTokenResponse>) {
    let issued = state.csrf().issue();
    let jar = jar.add(state.csrf().cookie(&issued));
    tracing::debug!("Issued CSRF token");
    (jar, Json(CsrfTokenResponse { token: issued.token }))
}
