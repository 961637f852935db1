//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `zarin_storefront`
//!
//! ## Tables (schema `catalog`)
//!
//! - `category` - Product groupings (rings, necklaces, coins, ...)
//! - `product` - Catalog items; only `active` rows are public
//! - `coupon` - Discount codes
//!
//! # Resilience
//!
//! Repositories issue plain queries. Callers that need to ride out
//! connection blips wrap them in [`retry::with_retry`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p zarin-cli -- migrate
//! ```

pub mod categories;
pub mod coupons;
pub mod products;
pub mod retry;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use coupons::CouponRepository;
pub use products::{ProductQuery, ProductRepository};
pub use retry::{Classify, ErrorClass, RetryPolicy, RetryableCodes, TransientKind, with_retry};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Classify for RepositoryError {
    fn classify(&self, codes: &RetryableCodes) -> ErrorClass {
        match self {
            Self::Database(err) => err.classify(codes),
        }
    }

    fn error_code(&self) -> Option<String> {
        match self {
            Self::Database(err) => err.error_code(),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_delegates_classification() {
        let codes = RetryableCodes::default();
        let err = RepositoryError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(
            err.classify(&codes),
            ErrorClass::Transient(TransientKind::Timeout)
        );
        assert_eq!(
            RepositoryError::Database(sqlx::Error::RowNotFound).classify(&codes),
            ErrorClass::Fatal
        );
        assert_eq!(RepositoryError::Database(sqlx::Error::RowNotFound).error_code(), None);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("gold"), "gold");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
