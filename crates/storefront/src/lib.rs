//! Zarin storefront API.
//!
//! A JSON catalog and coupon API for a jewelry shop. Every database call goes
//! through [`db::with_retry`], and every state-changing request must pass the
//! double-submit CSRF guard in [`middleware::csrf`].
//!
//! The crate is a library so integration tests can build the exact router
//! the binary serves via [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{from_fn, map_response},
};
use tower_http::trace::TraceLayer;

use config::Environment;
use state::AppState;

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the binary, since they only matter once a
/// client is initialized.
pub fn app(state: AppState) -> Router {
    let mut router = routes::routes(&state);

    if state.config().environment == Environment::Development {
        router = router.layer(map_response(error::expose_error_detail));
    }

    router = if state.config().is_production() {
        router.layer(from_fn(middleware::security_headers_with_hsts_middleware))
    } else {
        router.layer(from_fn(middleware::security_headers_middleware))
    };

    router
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
