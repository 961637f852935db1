//! Discount coupons.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use zarin_core::{CouponId, CouponKind};

/// Reasons a coupon cannot be applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("This coupon is no longer active")]
    Inactive,
    #[error("This coupon is not valid yet")]
    NotStarted,
    #[error("This coupon has expired")]
    Expired,
    #[error("This coupon has reached its usage limit")]
    UsageLimitReached,
    #[error("A minimum purchase of {minimum} is required for this coupon")]
    MinimumNotMet { minimum: Decimal },
    #[error("Subtotal must be a positive amount")]
    InvalidSubtotal,
}

/// A discount code.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Coupon {
    pub id: CouponId,
    /// Upper-case code as typed by shoppers.
    pub code: String,
    pub kind: CouponKind,
    /// Percentage (0-100) or fixed amount, depending on `kind`.
    pub value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of applying a coupon to a subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponQuote {
    pub code: String,
    pub discount: Decimal,
    pub total: Decimal,
}

impl Coupon {
    /// Normalize user input to the stored code format.
    #[must_use]
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Check that the coupon can be used at `now` for `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponError`] rule that fails.
    pub fn check(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<(), CouponError> {
        if subtotal <= Decimal::ZERO {
            return Err(CouponError::InvalidSubtotal);
        }
        if !self.active {
            return Err(CouponError::Inactive);
        }
        if self.starts_at.is_some_and(|starts_at| starts_at > now) {
            return Err(CouponError::NotStarted);
        }
        if self.expires_at.is_some_and(|expires_at| expires_at <= now) {
            return Err(CouponError::Expired);
        }
        if self.max_uses.is_some_and(|max| self.used_count >= max) {
            return Err(CouponError::UsageLimitReached);
        }
        if let Some(minimum) = self.min_purchase
            && subtotal < minimum
        {
            return Err(CouponError::MinimumNotMet { minimum });
        }
        Ok(())
    }

    /// Apply the coupon to `subtotal`.
    ///
    /// Percentage discounts round down to a whole currency unit. The discount
    /// never exceeds the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if [`Coupon::check`] fails.
    pub fn quote(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<CouponQuote, CouponError> {
        self.check(subtotal, now)?;

        let raw = match self.kind {
            CouponKind::Percentage => {
                let percent = self.value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
                (subtotal * percent / Decimal::ONE_HUNDRED).floor()
            }
            CouponKind::Fixed => self.value.max(Decimal::ZERO),
        };
        let discount = raw.min(subtotal);

        Ok(CouponQuote {
            code: self.code.clone(),
            discount,
            total: subtotal - discount,
        })
    }
}
