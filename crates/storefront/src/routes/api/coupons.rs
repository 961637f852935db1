//! Coupon redemption quotes.

use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db::{CouponRepository, with_retry};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::CouponQuote;
use crate::state::AppState;

/// Body of `POST /api/coupons/apply`.
#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
    pub subtotal: Decimal,
}

/// Quote the discount a coupon gives on a subtotal.
///
/// Does not consume a use; redemption happens at checkout.
pub async fn apply(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<ApplyCouponRequest>, AppError>,
) -> Result<Json<CouponQuote>> {
    if body.code.trim().is_empty() {
        return Err(AppError::BadRequest("Coupon code is required".to_string()));
    }

    let repo = CouponRepository::new(state.pool());
    let coupon = with_retry(state.retry_policy(), || repo.get_by_code(&body.code))
        .await?
        .ok_or_else(|| AppError::NotFound("Coupon".to_string()))?;

    let quote = coupon.quote(body.subtotal, Utc::now())?;

    add_breadcrumb("coupon", "Quoted coupon", Some(&[("code", quote.code.as_str())]));
    tracing::info!(code = %quote.code, discount = %quote.discount, "Coupon quoted");

    Ok(Json(quote))
}
