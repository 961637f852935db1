//! Product repository.
//!
//! Every query here filters on `status = 'active'`; drafts and archived
//! items never leave the database through the storefront.

use sqlx::PgPool;

use zarin_core::{CategoryId, Slug};

use super::{RepositoryError, escape_like};
use crate::models::Product;

/// Default page size for product listings.
pub const DEFAULT_LIMIT: i64 = 24;
/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 100;

/// Filters and paging for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,
    /// Restrict to one category.
    pub category: Option<Slug>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductQuery {
    /// Page size clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Offset, never negative.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// `LIKE` pattern for the search term, or `None` when blank.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{}%", escape_like(term)))
    }
}

/// Repository for product reads.
#[derive(Clone, Copy)]
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT p.id, p.category_id, p.slug, p.name, p.description, p.price,
                   p.compare_at_price, p.weight_grams, p.karat, p.status,
                   p.image_url, p.created_at, p.updated_at
            FROM catalog.product p
            LEFT JOIN catalog.category c ON c.id = p.category_id
            WHERE p.status = 'active'
              AND ($1::text IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1)
              AND ($2::text IS NULL OR c.slug = $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(query.search_pattern())
        .bind(query.category.as_ref())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// List active products in a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, category_id, slug, name, description, price,
                   compare_at_price, weight_grams, karat, status,
                   image_url, created_at, updated_at
            FROM catalog.product
            WHERE status = 'active' AND category_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(category_id)
        .bind(limit.clamp(1, MAX_LIMIT))
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get an active product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, category_id, slug, name, description, price,
                   compare_at_price, weight_grams, karat, status,
                   image_url, created_at, updated_at
            FROM catalog.product
            WHERE slug = $1 AND status = 'active'
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_bounds() {
        let mut query = ProductQuery::default();
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        query.limit = Some(0);
        assert_eq!(query.limit(), 1);
        query.limit = Some(1_000);
        assert_eq!(query.limit(), MAX_LIMIT);
        query.limit = Some(12);
        assert_eq!(query.limit(), 12);
    }

    #[test]
    fn test_offset_is_never_negative() {
        let query = ProductQuery {
            offset: Some(-10),
            ..ProductQuery::default()
        };
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_search_pattern() {
        let mut query = ProductQuery::default();
        assert_eq!(query.search_pattern(), None);

        query.search = Some("   ".to_owned());
        assert_eq!(query.search_pattern(), None);

        query.search = Some(" gold ".to_owned());
        assert_eq!(query.search_pattern().as_deref(), Some("%gold%"));

        query.search = Some("18_k".to_owned());
        assert_eq!(query.search_pattern().as_deref(), Some("%18\\_k%"));
    }
}
