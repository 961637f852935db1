//! Coupon repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Coupon;

/// Repository for coupon lookups.
#[derive(Clone, Copy)]
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a coupon by code. The code is matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(
            r"
            SELECT id, code, kind, value, min_purchase, max_uses, used_count,
                   starts_at, expires_at, active, created_at
            FROM catalog.coupon
            WHERE code = $1
            ",
        )
        .bind(Coupon::normalize_code(code))
        .fetch_optional(self.pool)
        .await?;

        Ok(coupon)
    }
}
