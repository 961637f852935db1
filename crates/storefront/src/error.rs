//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Server errors are captured to
//! Sentry before the response is built; clients receive `{"error": "..."}`.
//!
//! Internal details are withheld from the body. The underlying message rides
//! along in an [`ErrorDetail`] response extension, and
//! [`expose_error_detail`] (mounted only in development) swaps it into the
//! body.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::CouponError;

/// Message returned for server errors outside development.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Coupon exists but cannot be applied.
    #[error("{0}")]
    Coupon(#[from] CouponError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Underlying message of a server error, attached to the response.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Coupon(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show any client.
    fn public_message(&self) -> String {
        match self {
            Self::Database(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            Self::Coupon(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut response = (status, Json(json!({ "error": self.public_message() }))).into_response();
        if status.is_server_error() {
            response.extensions_mut().insert(ErrorDetail(self.to_string()));
        }
        response
    }
}

/// Replace the generic body of a server error with its [`ErrorDetail`].
///
/// Mount with `axum::middleware::map_response` in development only.
pub async fn expose_error_detail(mut response: Response) -> Response {
    let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    let status = response.status();
    (status, Json(json!({ "error": detail }))).into_response()
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("coupon", "Applied coupon", Some(&[("code", "NOWRUZ")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product".to_string());
        assert_eq!(err.to_string(), "Not found: product");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    fn pool_timeout() -> AppError {
        AppError::Database(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Coupon(CouponError::Expired)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(pool_timeout()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let json = body_json(pool_timeout().into_response()).await;
        assert_eq!(json["error"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_coupon_rejection_reason_is_shown() {
        let err = AppError::Coupon(CouponError::MinimumNotMet {
            minimum: Decimal::new(10_000_000, 0),
        });
        let json = body_json(err.into_response()).await;
        assert_eq!(
            json["error"],
            "A minimum purchase of 10000000 is required for this coupon"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_bad_request() {
        use axum::{Router, body::Body, routing::post};
        use tower::ServiceExt;

        async fn echo(
            axum_extra::extract::WithRejection(Json(body), _): axum_extra::extract::WithRejection<
                Json<serde_json::Value>,
                AppError,
            >,
        ) -> Json<serde_json::Value> {
            Json(body)
        }

        let response = Router::new()
            .route("/", post(echo))
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn test_expose_error_detail_reveals_message() {
        let response = expose_error_detail(pool_timeout().into_response()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        let message = json["error"].as_str().unwrap();
        assert!(message.starts_with("Database error"));
        assert_ne!(message, INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_expose_error_detail_ignores_client_errors() {
        let response = AppError::BadRequest("limit must be at most 100".to_string()).into_response();
        let response = expose_error_detail(response).await;
        let json = body_json(response).await;
        assert_eq!(json["error"], "limit must be at most 100");
    }
}
