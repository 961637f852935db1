//! Domain models for storefront.

pub mod category;
pub mod coupon;
pub mod product;

pub use category::Category;
pub use coupon::{Coupon, CouponError, CouponQuote};
pub use product::Product;
