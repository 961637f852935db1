//! Catalog products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use zarin_core::{CategoryId, Price, ProductId, ProductStatus, Slug};

/// A jewelry item in the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub slug: Slug,
    pub name: String,
    pub description: String,
    /// Price in the store currency.
    pub price: Decimal,
    /// Pre-discount price shown struck through, if any.
    pub compare_at_price: Option<Decimal>,
    pub weight_grams: Option<Decimal>,
    /// Gold purity (e.g. 18 or 24), when applicable.
    pub karat: Option<i16>,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The selling price as a typed [`Price`].
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::irr(self.price)
    }

    /// Whether the product is currently marked down.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price
            .is_some_and(|compare_at| compare_at > self.price)
    }
}
