//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::RetryPolicy;
use crate::middleware::CsrfGuard;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and owns everything a request
/// needs: configuration, the connection pool, the retry policy built from
/// configuration, and the CSRF signer. Nothing lives in process globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    retry_policy: RetryPolicy,
    csrf: CsrfGuard,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let retry_policy = config.db_retry.policy();
        let csrf = CsrfGuard::new(config.csrf_secret.clone(), config.is_production());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                retry_policy,
                csrf,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Retry policy for database calls.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry_policy
    }

    /// CSRF token issuer and validator.
    #[must_use]
    pub fn csrf(&self) -> &CsrfGuard {
        &self.inner.csrf
    }
}

impl FromRef<AppState> for CsrfGuard {
    fn from_ref(state: &AppState) -> Self {
        state.csrf().clone()
    }
}
