//! JSON API handlers under `/api`.

pub mod categories;
pub mod coupons;
pub mod csrf;
pub mod products;
