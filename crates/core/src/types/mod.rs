//! Core types for Zarin.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod slug;
pub mod status;

pub use id::*;
pub use price::{CurrencyCode, Price};
pub use slug::{Slug, SlugError};
pub use status::*;
