//! Security headers for a JSON-only API.
//!
//! Nothing served here is meant to be rendered or framed, so the policy is
//! as tight as it gets.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Headers applied to every response.
const HEADERS: [(HeaderName, &str); 6] = [
    (X_FRAME_OPTIONS, "DENY"),
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (REFERRER_POLICY, "no-referrer"),
    (
        CONTENT_SECURITY_POLICY,
        "default-src 'none'; frame-ancestors 'none'; base-uri 'none'; form-action 'none'",
    ),
    (
        HeaderName::from_static("cross-origin-resource-policy"),
        "same-origin",
    ),
    (
        HeaderName::from_static("permissions-policy"),
        "camera=(), geolocation=(), microphone=(), payment=()",
    ),
];

/// Add security headers to all responses.
///
/// `Cache-Control: no-store` is set only when the handler didn't choose its
/// own caching; CSRF tokens and coupon quotes must never be cached.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    apply(next.run(request).await, false)
}

/// Same as [`security_headers_middleware`] plus `Strict-Transport-Security`.
///
/// Used in production.
pub async fn security_headers_with_hsts_middleware(request: Request, next: Next) -> Response {
    apply(next.run(request).await, true)
}

fn apply(mut response: Response, hsts: bool) -> Response {
    let headers = response.headers_mut();

    for (name, value) in HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    if hsts {
        headers.insert(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        );
    }

    response
}
