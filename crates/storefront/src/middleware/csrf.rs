//! CSRF protection using the double-submit cookie pattern.
//!
//! `GET /api/csrf` hands the client a random token in the response body and
//! sets an httpOnly cookie holding `token.signature`. State-changing requests
//! must echo the token in the `x-csrf-token` header. A cross-site page can
//! make the browser send the cookie but can neither read it nor set the
//! header, so a forged request fails the match.
//!
//! The signature is the first 16 hex characters of
//! `sha256(token + "." + secret)`; it stops an attacker who can plant cookies
//! on a sibling subdomain from choosing their own token.
//!
//! Every failure produces the same `403` body. The specific cause is only
//! logged.

use axum::{
    Json,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Cookie holding `token.signature`.
pub const CSRF_COOKIE_NAME: &str = "csrf-token";

/// Header the client echoes the token in.
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// Body message for every rejected request.
pub const CSRF_ERROR_MESSAGE: &str = "Invalid or missing CSRF token";

/// Random bytes per token (hex-encoded to 64 characters).
const TOKEN_BYTES: usize = 32;

/// Hex characters of the SHA-256 digest kept as the signature.
const SIGNATURE_HEX_LEN: usize = 16;

/// Cookie lifetime.
const COOKIE_MAX_AGE_HOURS: i64 = 24;

/// Why a request failed CSRF validation. Never shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CsrfError {
    #[error("missing {CSRF_HEADER_NAME} header")]
    MissingHeader,
    #[error("missing {CSRF_COOKIE_NAME} cookie")]
    MissingCookie,
    #[error("malformed {CSRF_COOKIE_NAME} cookie")]
    MalformedCookie,
    #[error("header token does not match cookie token")]
    TokenMismatch,
    #[error("cookie signature is invalid")]
    InvalidSignature,
}

/// Uniform rejection returned by [`csrf_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct CsrfRejection;

impl IntoResponse for CsrfRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": CSRF_ERROR_MESSAGE })),
        )
            .into_response()
    }
}

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Raw token for the client to send back in the header.
    pub token: String,
    /// `token.signature`, stored in the cookie.
    pub cookie_value: String,
}

/// Issues and validates CSRF tokens.
///
/// Cheap to clone; held in `AppState`.
#[derive(Clone)]
pub struct CsrfGuard {
    secret: SecretString,
    secure_cookie: bool,
}

impl std::fmt::Debug for CsrfGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfGuard")
            .field("secret", &"[REDACTED]")
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

impl CsrfGuard {
    /// Create a guard signing with `secret`.
    ///
    /// `secure_cookie` adds the `Secure` attribute; set it in production.
    #[must_use]
    pub const fn new(secret: SecretString, secure_cookie: bool) -> Self {
        Self {
            secret,
            secure_cookie,
        }
    }

    /// Generate a new token and its signed cookie value.
    #[must_use]
    pub fn issue(&self) -> IssuedToken {
        let token = hex::encode(rand::random::<[u8; TOKEN_BYTES]>());
        let cookie_value = format!("{token}.{}", self.sign(&token));
        IssuedToken {
            token,
            cookie_value,
        }
    }

    /// Signature for `token`: the first 16 hex chars of `sha256(token.secret)`.
    #[must_use]
    pub fn sign(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hasher.update(b".");
        hasher.update(self.secret.expose_secret().as_bytes());
        let mut signature = hex::encode(hasher.finalize());
        signature.truncate(SIGNATURE_HEX_LEN);
        signature
    }

    /// Build the `Set-Cookie` cookie for an issued token.
    #[must_use]
    pub fn cookie(&self, issued: &IssuedToken) -> Cookie<'static> {
        Cookie::build((CSRF_COOKIE_NAME, issued.cookie_value.clone()))
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::hours(COOKIE_MAX_AGE_HOURS))
            .build()
    }

    /// Check a header token against a cookie value.
    ///
    /// # Errors
    ///
    /// Returns the first [`CsrfError`] encountered.
    pub fn verify(
        &self,
        header_token: Option<&str>,
        cookie_value: Option<&str>,
    ) -> Result<(), CsrfError> {
        let header_token = header_token
            .filter(|t| !t.is_empty())
            .ok_or(CsrfError::MissingHeader)?;
        let cookie_value = cookie_value
            .filter(|v| !v.is_empty())
            .ok_or(CsrfError::MissingCookie)?;
        let (cookie_token, signature) =
            split_cookie_value(cookie_value).ok_or(CsrfError::MalformedCookie)?;

        if !constant_time_compare(header_token, cookie_token) {
            return Err(CsrfError::TokenMismatch);
        }

        if !constant_time_compare(&self.sign(cookie_token), signature) {
            return Err(CsrfError::InvalidSignature);
        }

        Ok(())
    }
}

/// Whether requests with this method must carry a valid token.
///
/// Only `GET`, `HEAD` and `OPTIONS` are exempt.
#[must_use]
pub fn requires_csrf(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Middleware rejecting state-changing requests without a valid token.
///
/// # Example
///
/// ```rust,ignore
/// Router::new()
///     .route("/api/coupons/apply", post(apply))
///     .layer(axum::middleware::from_fn_with_state(guard, csrf_middleware))
/// ```
pub async fn csrf_middleware(
    State(guard): State<CsrfGuard>,
    request: Request,
    next: Next,
) -> Response {
    if !requires_csrf(request.method()) {
        return next.run(request).await;
    }

    let header_token = request
        .headers()
        .get(CSRF_HEADER_NAME)
        .and_then(|v| v.to_str().ok());
    let jar = CookieJar::from_headers(request.headers());
    let cookie_value = jar.get(CSRF_COOKIE_NAME).map(Cookie::value);

    if let Err(reason) = guard.verify(header_token, cookie_value) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            reason = %reason,
            "CSRF validation failed"
        );
        return CsrfRejection.into_response();
    }

    next.run(request).await
}

/// Split `token.signature` into its two non-empty halves.
fn split_cookie_value(value: &str) -> Option<(&str, &str)> {
    let mut parts = value.split('.');
    let token = parts.next()?;
    let signature = parts.next()?;
    if parts.next().is_some() || token.is_empty() || signature.is_empty() {
        return None;
    }
    Some((token, signature))
}

/// Constant-time string comparison to prevent timing attacks.
///
/// The length check leaks whether the lengths differ, which is acceptable:
/// token and signature lengths are fixed and public.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
