//! CSRF guard behavior through the full storefront router.

use axum::http::{StatusCode, header};
use serde_json::json;

use zarin_integration_tests::{get, issue_csrf, offline_app, post_json, send};
use zarin_storefront::config::Environment;
use zarin_storefront::middleware::CSRF_ERROR_MESSAGE;

const APPLY: &str = "/api/coupons/apply";

fn blank_code() -> serde_json::Value {
    // Rejected by the handler before any database access
    json!({ "code": "   ", "subtotal": 1_000_000 })
}

#[tokio::test]
async fn test_issue_sets_cookie_and_returns_token() {
    let response = send(offline_app(Environment::Production), get("/api/csrf")).await;

    assert_eq!(response.status, StatusCode::OK);
    let token = response.json["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);

    let set_cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with(&format!("csrf-token={token}.")));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=86400"));
}

#[tokio::test]
async fn test_cookie_is_secure_only_in_production() {
    let dev = send(offline_app(Environment::Development), get("/api/csrf")).await;
    let prod = send(offline_app(Environment::Production), get("/api/csrf")).await;

    assert!(!dev.headers[header::SET_COOKIE].to_str().unwrap().contains("Secure"));
    assert!(prod.headers[header::SET_COOKIE].to_str().unwrap().contains("Secure"));
}

#[tokio::test]
async fn test_matching_token_passes_guard() {
    let app = offline_app(Environment::Development);
    let (token, cookie) = issue_csrf(app.clone()).await;

    let response = send(
        app,
        post_json(APPLY, &blank_code(), Some(&token), Some(&cookie)),
    )
    .await;

    // The handler ran and rejected the blank code itself
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json["error"], "Coupon code is required");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request_json() {
    let app = offline_app(Environment::Development);
    let (token, cookie) = issue_csrf(app.clone()).await;
    let body = json!({ "code": "X", "subtotal": "abc" });

    let response = send(app, post_json(APPLY, &body, Some(&token), Some(&cookie))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json["error"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_missing_header_is_forbidden() {
    let app = offline_app(Environment::Development);
    let (_, cookie) = issue_csrf(app.clone()).await;

    let response = send(app, post_json(APPLY, &blank_code(), None, Some(&cookie))).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json["error"], CSRF_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_missing_cookie_is_forbidden() {
    let app = offline_app(Environment::Development);
    let (token, _) = issue_csrf(app.clone()).await;

    let response = send(app, post_json(APPLY, &blank_code(), Some(&token), None)).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_from_another_session_is_forbidden() {
    let app = offline_app(Environment::Development);
    let (token_a, _) = issue_csrf(app.clone()).await;
    let (_, cookie_b) = issue_csrf(app.clone()).await;

    let response = send(
        app,
        post_json(APPLY, &blank_code(), Some(&token_a), Some(&cookie_b)),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json["error"], CSRF_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_self_made_cookie_is_forbidden() {
    let app = offline_app(Environment::Development);
    let forged_token = "a".repeat(64);
    let forged_cookie = format!("{forged_token}.0123456789abcdef");

    let response = send(
        app,
        post_json(
            APPLY,
            &blank_code(),
            Some(&forged_token),
            Some(&forged_cookie),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_signed_by_other_secret_is_forbidden() {
    // Same shape, different signing key
    let other = zarin_storefront::middleware::CsrfGuard::new(
        secrecy::SecretString::from("k9$Wm2!Xq7@Lr4#Tz8^Vb3&Np6*Hc1%G"),
        false,
    );
    let issued = other.issue();

    let response = send(
        offline_app(Environment::Development),
        post_json(
            APPLY,
            &blank_code(),
            Some(&issued.token),
            Some(&issued.cookie_value),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_safe_methods_skip_guard() {
    let app = offline_app(Environment::Development);

    // Rejected by parameter validation, not by the guard
    let response = send(app, get("/api/products?category=Not%20A%20Slug")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_ne!(response.json["error"], CSRF_ERROR_MESSAGE);
}
