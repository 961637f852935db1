//! Catalog categories.

use chrono::{DateTime, Utc};
use serde::Serialize;

use zarin_core::{CategoryId, Slug};

/// A product grouping such as rings or gold coins.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub slug: Slug,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
