//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness (database reachable)
//!
//! # API (all behind the CSRF guard)
//! GET  /api/csrf                - Issue a CSRF token
//! GET  /api/categories          - Category listing
//! GET  /api/categories/{slug}   - Category with its products
//! GET  /api/products            - Product listing (?q=&category=&limit=&offset=)
//! GET  /api/products/{slug}     - Product detail
//! POST /api/coupons/apply       - Quote a coupon against a subtotal
//! ```

pub mod api;
pub mod health;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, coupon_rate_limiter, csrf_middleware};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(api::categories::index))
        .route("/categories/{slug}", get(api::categories::show))
        .route("/products", get(api::products::index))
        .route("/products/{slug}", get(api::products::show))
        .route("/csrf", get(api::csrf::issue))
        .layer(api_rate_limiter())
}

/// Create the coupon routes router.
pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/coupons/apply", post(api::coupons::apply))
        .layer(coupon_rate_limiter())
}

/// Create the `/api` router with the CSRF guard applied.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .merge(coupon_routes())
        .layer(from_fn_with_state(state.clone(), csrf_middleware))
}

/// Create all routes for the storefront.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes(state))
}
