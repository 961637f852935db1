//! Category endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use zarin_core::Slug;

use super::products::ProductView;
use crate::db::{CategoryRepository, ProductRepository, products::DEFAULT_LIMIT, with_retry};
use crate::error::{AppError, Result};
use crate::models::Category;
use crate::state::AppState;

/// A category with its active products.
#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<ProductView>,
}

/// `GET /api/categories`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let repo = CategoryRepository::new(state.pool());
    let categories = with_retry(state.retry_policy(), || repo.list()).await?;
    Ok(Json(categories))
}

/// `GET /api/categories/{slug}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetail>> {
    let slug = Slug::parse(&slug).map_err(|_| AppError::NotFound("Category".to_string()))?;
    let policy = state.retry_policy();

    let categories = CategoryRepository::new(state.pool());
    let category = with_retry(policy, || categories.get_by_slug(&slug))
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

    let products = ProductRepository::new(state.pool());
    let items = with_retry(policy, || products.list_by_category(category.id, DEFAULT_LIMIT)).await?;

    Ok(Json(CategoryDetail {
        category,
        products: items.into_iter().map(ProductView::from).collect(),
    }))
}
