//! Product endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use zarin_core::Slug;

use crate::db::{ProductQuery, ProductRepository, with_retry};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Query string for `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    /// Convert to a repository query. An empty `category` means no filter.
    fn into_query(self) -> Result<ProductQuery> {
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .map(|c| Slug::parse(c.trim()))
            .transpose()
            .map_err(|e| AppError::BadRequest(format!("Invalid category: {e}")))?;

        Ok(ProductQuery {
            search: self.q,
            category,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

/// Product as returned by the API, with a formatted price.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    /// e.g. `"12,500,000 IRR"`
    pub price_display: String,
    pub on_sale: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            price_display: product.price().display(),
            on_sale: product.is_on_sale(),
            product,
        }
    }
}

/// Page of products.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductView>,
    pub limit: i64,
    pub offset: i64,
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, AppError>,
) -> Result<Json<ProductPage>> {
    let query = params.into_query()?;
    let repo = ProductRepository::new(state.pool());
    let products = with_retry(state.retry_policy(), || repo.list(&query)).await?;

    Ok(Json(ProductPage {
        products: products.into_iter().map(ProductView::from).collect(),
        limit: query.limit(),
        offset: query.offset(),
    }))
}

/// `GET /api/products/{slug}`
///
/// Drafts and archived products are indistinguishable from missing ones.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductView>> {
    let slug = Slug::parse(&slug).map_err(|_| AppError::NotFound("Product".to_string()))?;
    let repo = ProductRepository::new(state.pool());

    let product = with_retry(state.retry_policy(), || repo.get_by_slug(&slug))
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    Ok(Json(ProductView::from(product)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_params_without_filters() {
        let query = ListParams::default().into_query().unwrap();
        assert!(query.category.is_none());
        assert_eq!(query.limit(), 24);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_blank_category_is_ignored() {
        let params = ListParams {
            category: Some("  ".to_string()),
            ..ListParams::default()
        };
        assert!(params.into_query().unwrap().category.is_none());
    }

    #[test]
    fn test_invalid_category_is_bad_request() {
        let params = ListParams {
            category: Some("Gold Rings!".to_string()),
            ..ListParams::default()
        };
        assert!(matches!(params.into_query(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_valid_category_and_paging() {
        let params = ListParams {
            q: Some("bangle".to_string()),
            category: Some("bracelets".to_string()),
            limit: Some(500),
            offset: Some(-3),
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.limit(), 100);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.search.as_deref(), Some("bangle"));
        assert_eq!(query.category.as_ref().map(Slug::as_str), Some("bracelets"));
    }
}
