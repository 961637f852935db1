//! Seed the catalog with a sample jewelry collection.
//!
//! Inserts are upserts keyed on slug/code, so running the command twice
//! leaves one copy of everything. `--reset` clears the catalog first.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

use zarin_core::{CouponKind, ProductStatus, Slug};
use zarin_storefront::db::{self, RetryPolicy, with_retry};

use super::{CommandError, database_url};

struct SeedCategory {
    slug: &'static str,
    name: &'static str,
    description: &'static str,
}

struct SeedProduct {
    category: &'static str,
    slug: &'static str,
    name: &'static str,
    description: &'static str,
    price: i64,
    compare_at_price: Option<i64>,
    /// Hundredths of a gram.
    weight_centigrams: i64,
    karat: i16,
    status: ProductStatus,
}

struct SeedCoupon {
    code: &'static str,
    kind: CouponKind,
    value: i64,
    min_purchase: Option<i64>,
    max_uses: Option<i32>,
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        slug: "rings",
        name: "Rings",
        description: "Engagement bands, signets and everyday stackers.",
    },
    SeedCategory {
        slug: "necklaces",
        name: "Necklaces",
        description: "Chains, pendants and name necklaces.",
    },
    SeedCategory {
        slug: "bracelets",
        name: "Bracelets",
        description: "Bangles and link bracelets.",
    },
    SeedCategory {
        slug: "earrings",
        name: "Earrings",
        description: "Studs, hoops and drops.",
    },
    SeedCategory {
        slug: "coins",
        name: "Gold Coins",
        description: "Bullion coins for gifting and saving.",
    },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        category: "rings",
        slug: "classic-solitaire-ring",
        name: "Classic Solitaire Ring",
        description: "18k yellow gold band with a single round setting.",
        price: 48_500_000,
        compare_at_price: None,
        weight_centigrams: 320,
        karat: 18,
        status: ProductStatus::Active,
    },
    SeedProduct {
        category: "rings",
        slug: "twisted-band-ring",
        name: "Twisted Band Ring",
        description: "Two strands of rose gold twisted into one band.",
        price: 21_900_000,
        compare_at_price: Some(25_000_000),
        weight_centigrams: 185,
        karat: 18,
        status: ProductStatus::Active,
    },
    SeedProduct {
        category: "rings",
        slug: "signet-ring",
        name: "Signet Ring",
        description: "Flat-top signet, ready for engraving.",
        price: 62_000_000,
        compare_at_price: None,
        weight_centigrams: 540,
        karat: 18,
        status: ProductStatus::Draft,
    },
    SeedProduct {
        category: "necklaces",
        slug: "venetian-chain",
        name: "Venetian Chain",
        description: "Box-link chain, 45 cm.",
        price: 37_400_000,
        compare_at_price: None,
        weight_centigrams: 410,
        karat: 18,
        status: ProductStatus::Active,
    },
    SeedProduct {
        category: "necklaces",
        slug: "crescent-pendant",
        name: "Crescent Pendant",
        description: "Small crescent moon pendant on a fine chain.",
        price: 18_750_000,
        compare_at_price: Some(21_000_000),
        weight_centigrams: 160,
        karat: 18,
        status: ProductStatus::Active,
    },
    SeedProduct {
        category: "bracelets",
        slug: "hammered-bangle",
        name: "Hammered Bangle",
        description: "Hand-hammered bangle with a satin finish.",
        price: 95_000_000,
        compare_at_price: None,
        weight_centigrams: 1_120,
        karat: 18,
        status: ProductStatus::Active,
    },
    SeedProduct {
        category: "bracelets",
        slug: "tennis-bracelet",
        name: "Tennis Bracelet",
        description: "Line bracelet with a box clasp.",
        price: 128_000_000,
        compare_at_price: None,
        weight_centigrams: 980,
        karat: 18,
        status: ProductStatus::Archived,
    },
    SeedProduct {
        category: "earrings",
        slug: "mini-hoops",
        name: "Mini Hoops",
        description: "12 mm huggie hoops.",
        price: 14_200_000,
        compare_at_price: None,
        weight_centigrams: 120,
        karat: 18,
        status: ProductStatus::Active,
    },
    SeedProduct {
        category: "earrings",
        slug: "pearl-drop-earrings",
        name: "Pearl Drop Earrings",
        description: "Freshwater pearls on gold drops.",
        price: 26_300_000,
        compare_at_price: None,
        weight_centigrams: 210,
        karat: 18,
        status: ProductStatus::Active,
    },
    SeedProduct {
        category: "coins",
        slug: "quarter-bahar-azadi",
        name: "Quarter Bahar Azadi Coin",
        description: "Quarter coin, 2.03 g of 22k gold.",
        price: 210_000_000,
        compare_at_price: None,
        weight_centigrams: 203,
        karat: 22,
        status: ProductStatus::Active,
    },
    SeedProduct {
        category: "coins",
        slug: "half-bahar-azadi",
        name: "Half Bahar Azadi Coin",
        description: "Half coin, 4.07 g of 22k gold.",
        price: 395_000_000,
        compare_at_price: None,
        weight_centigrams: 407,
        karat: 22,
        status: ProductStatus::Active,
    },
    SeedProduct {
        category: "coins",
        slug: "gold-bar-1g",
        name: "1 g Gold Bar",
        description: "Minted 24k bar in tamper-evident card.",
        price: 98_000_000,
        compare_at_price: None,
        weight_centigrams: 100,
        karat: 24,
        status: ProductStatus::Active,
    },
];

const COUPONS: &[SeedCoupon] = &[
    SeedCoupon {
        code: "NOWRUZ",
        kind: CouponKind::Percentage,
        value: 10,
        min_purchase: Some(20_000_000),
        max_uses: Some(500),
    },
    SeedCoupon {
        code: "WELCOME",
        kind: CouponKind::Fixed,
        value: 1_000_000,
        min_purchase: None,
        max_uses: None,
    },
];

/// Rows written by a seed run.
#[derive(Debug, Default)]
struct SeedSummary {
    categories: usize,
    products: usize,
    coupons: usize,
}

/// Seed the sample catalog.
///
/// # Errors
///
/// Returns an error if the seed data is invalid, the database URL is missing,
/// or a query fails after retries.
pub async fn catalog(reset: bool) -> Result<(), CommandError> {
    validate()?;

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let policy = RetryPolicy::default();
    let summary = with_retry(&policy, || write_catalog(&pool, reset)).await?;

    info!(
        categories = summary.categories,
        products = summary.products,
        coupons = summary.coupons,
        reset,
        "Catalog seeded"
    );
    Ok(())
}

/// Check slugs, category references and coupon values before touching the
/// database.
fn validate() -> Result<(), CommandError> {
    for category in CATEGORIES {
        Slug::parse(category.slug)
            .map_err(|e| CommandError::InvalidSeed(format!("category {}: {e}", category.slug)))?;
    }

    for product in PRODUCTS {
        Slug::parse(product.slug)
            .map_err(|e| CommandError::InvalidSeed(format!("product {}: {e}", product.slug)))?;
        if !CATEGORIES.iter().any(|c| c.slug == product.category) {
            return Err(CommandError::InvalidSeed(format!(
                "product {} references unknown category {}",
                product.slug, product.category
            )));
        }
    }

    for coupon in COUPONS {
        if coupon.code != coupon.code.to_uppercase() {
            return Err(CommandError::InvalidSeed(format!(
                "coupon {} must be upper-case",
                coupon.code
            )));
        }
        if coupon.kind == CouponKind::Percentage && !(0..=100).contains(&coupon.value) {
            return Err(CommandError::InvalidSeed(format!(
                "coupon {} percentage out of range",
                coupon.code
            )));
        }
    }

    Ok(())
}

/// Write everything in one transaction so a retried run starts clean.
async fn write_catalog(pool: &PgPool, reset: bool) -> Result<SeedSummary, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    if reset {
        sqlx::query("TRUNCATE catalog.product, catalog.category, catalog.coupon RESTART IDENTITY")
            .execute(&mut *tx)
            .await?;
    }

    for category in CATEGORIES {
        sqlx::query(
            r"
            INSERT INTO catalog.category (slug, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO UPDATE
            SET name = EXCLUDED.name, description = EXCLUDED.description
            ",
        )
        .bind(category.slug)
        .bind(category.name)
        .bind(category.description)
        .execute(&mut *tx)
        .await?;
        summary.categories += 1;
    }

    for product in PRODUCTS {
        sqlx::query(
            r"
            INSERT INTO catalog.product
                (category_id, slug, name, description, price, compare_at_price,
                 weight_grams, karat, status)
            SELECT c.id, $2, $3, $4, $5, $6, $7, $8, $9
            FROM catalog.category c WHERE c.slug = $1
            ON CONFLICT (slug) DO UPDATE
            SET category_id = EXCLUDED.category_id,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                compare_at_price = EXCLUDED.compare_at_price,
                weight_grams = EXCLUDED.weight_grams,
                karat = EXCLUDED.karat,
                status = EXCLUDED.status
            ",
        )
        .bind(product.category)
        .bind(product.slug)
        .bind(product.name)
        .bind(product.description)
        .bind(Decimal::new(product.price, 0))
        .bind(product.compare_at_price.map(|p| Decimal::new(p, 0)))
        .bind(Decimal::new(product.weight_centigrams, 2))
        .bind(product.karat)
        .bind(product.status)
        .execute(&mut *tx)
        .await?;
        summary.products += 1;
    }

    for coupon in COUPONS {
        sqlx::query(
            r"
            INSERT INTO catalog.coupon (code, kind, value, min_purchase, max_uses)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (code) DO UPDATE
            SET kind = EXCLUDED.kind,
                value = EXCLUDED.value,
                min_purchase = EXCLUDED.min_purchase,
                max_uses = EXCLUDED.max_uses
            ",
        )
        .bind(coupon.code)
        .bind(coupon.kind)
        .bind(Decimal::new(coupon.value, 0))
        .bind(coupon.min_purchase.map(|p| Decimal::new(p, 0)))
        .bind(coupon.max_uses)
        .execute(&mut *tx)
        .await?;
        summary.coupons += 1;
    }

    tx.commit().await?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_seed_data_is_valid() {
        assert!(validate().is_ok());
    }

    #[test]
    fn test_slugs_and_codes_are_unique() {
        let products: HashSet<_> = PRODUCTS.iter().map(|p| p.slug).collect();
        assert_eq!(products.len(), PRODUCTS.len());

        let codes: HashSet<_> = COUPONS.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), COUPONS.len());
    }

    #[test]
    fn test_every_category_has_an_active_product() {
        for category in CATEGORIES {
            assert!(
                PRODUCTS
                    .iter()
                    .any(|p| p.category == category.slug && p.status == ProductStatus::Active),
                "{} has no active product",
                category.slug
            );
        }
    }
}
