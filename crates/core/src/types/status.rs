//! Status and kind enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Publication status of a product.
///
/// Only [`ProductStatus::Active`] products are visible on the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "catalog.product_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

impl ProductStatus {
    /// Whether products with this status are shown to shoppers.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

/// How a coupon's value is applied to a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "catalog.coupon_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// `value` is a percentage of the subtotal (0-100).
    Percentage,
    /// `value` is an absolute amount in the store currency.
    Fixed,
}

impl std::fmt::Display for CouponKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage => write!(f, "percentage"),
            Self::Fixed => write!(f, "fixed"),
        }
    }
}

impl std::str::FromStr for CouponKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            _ => Err(format!("invalid coupon kind: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_products_are_visible() {
        assert!(ProductStatus::Active.is_visible());
        assert!(!ProductStatus::Draft.is_visible());
        assert!(!ProductStatus::Archived.is_visible());
    }

    #[test]
    fn test_product_status_round_trips_through_str() {
        for status in [
            ProductStatus::Draft,
            ProductStatus::Active,
            ProductStatus::Archived,
        ] {
            assert_eq!(status.to_string().parse::<ProductStatus>().unwrap(), status);
        }
        assert!("published".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_coupon_kind_serde_is_snake_case() {
        let json = serde_json::to_string(&CouponKind::Percentage).unwrap();
        assert_eq!(json, "\"percentage\"");
        let kind: CouponKind = serde_json::from_str("\"fixed\"").unwrap();
        assert_eq!(kind, CouponKind::Fixed);
    }
}
