//! Router-level behavior that needs no database: health, middleware
//! headers and error bodies.

use axum::http::{StatusCode, header};

use zarin_integration_tests::{get, offline_app, send};
use zarin_storefront::config::Environment;
use zarin_storefront::error::INTERNAL_ERROR_MESSAGE;
use zarin_storefront::middleware::REQUEST_ID_HEADER;

#[tokio::test]
async fn test_health_is_ok_without_database() {
    let response = send(offline_app(Environment::Production), get("/health")).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let response = send(offline_app(Environment::Production), get("/health/ready")).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_every_response_carries_request_id_and_security_headers() {
    let response = send(offline_app(Environment::Development), get("/health")).await;

    assert!(response.headers.contains_key(REQUEST_ID_HEADER));
    assert_eq!(response.headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(response.headers[header::X_FRAME_OPTIONS], "DENY");
    assert!(!response.headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
}

#[tokio::test]
async fn test_production_adds_hsts() {
    let response = send(offline_app(Environment::Production), get("/health")).await;
    assert!(response.headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
}

#[tokio::test]
async fn test_database_failure_is_generic_in_production() {
    let response = send(offline_app(Environment::Production), get("/api/categories")).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json["error"], INTERNAL_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_database_failure_is_detailed_in_development() {
    let response = send(offline_app(Environment::Development), get("/api/categories")).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = response.json["error"].as_str().unwrap();
    assert_ne!(message, INTERNAL_ERROR_MESSAGE);
    assert!(message.starts_with("Database error"));
}

#[tokio::test]
async fn test_malformed_slug_is_not_found() {
    let response = send(
        offline_app(Environment::Production),
        get("/api/products/Not_A_Slug"),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unparseable_query_is_bad_request_json() {
    let response = send(
        offline_app(Environment::Production),
        get("/api/products?limit=abc"),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json["error"].as_str().is_some_and(|m| !m.is_empty()));
}
