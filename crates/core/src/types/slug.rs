//! URL slug type for products and categories.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The input starts or ends with a hyphen, or has two in a row.
    #[error("slug hyphens must separate words")]
    MisplacedHyphen,
}

/// A URL-safe identifier such as `gold-chain-18k`.
///
/// ## Constraints
///
/// - Length: 1-96 characters
/// - Only lowercase ASCII letters, digits and `-`
/// - No leading, trailing or doubled hyphen
///
/// ## Examples
///
/// ```
/// use zarin_core::Slug;
///
/// assert!(Slug::parse("gold-chain-18k").is_ok());
/// assert!(Slug::parse("rings").is_ok());
///
/// assert!(Slug::parse("").is_err());
/// assert!(Slug::parse("Gold-Chain").is_err());
/// assert!(Slug::parse("-ring").is_err());
/// assert!(Slug::parse("ring--set").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 96;

    /// Parse a `Slug` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 96 characters,
    /// contains anything other than `[a-z0-9-]`, or misplaces a hyphen.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidCharacter(c));
        }

        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::MisplacedHyphen);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_slugs() {
        assert!(Slug::parse("ring").is_ok());
        assert!(Slug::parse("gold-chain-18k").is_ok());
        assert!(Slug::parse("2024-collection").is_ok());
        assert!(Slug::parse(&"a".repeat(96)).is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Slug::parse(&"a".repeat(97)),
            Err(SlugError::TooLong { max: 96 })
        ));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert_eq!(
            Slug::parse("Gold"),
            Err(SlugError::InvalidCharacter('G'))
        );
        assert_eq!(
            Slug::parse("gold chain"),
            Err(SlugError::InvalidCharacter(' '))
        );
        assert_eq!(
            Slug::parse("انگشتر"),
            Err(SlugError::InvalidCharacter('ا'))
        );
    }

    #[test]
    fn test_parse_misplaced_hyphens() {
        assert_eq!(Slug::parse("-ring"), Err(SlugError::MisplacedHyphen));
        assert_eq!(Slug::parse("ring-"), Err(SlugError::MisplacedHyphen));
        assert_eq!(Slug::parse("ring--set"), Err(SlugError::MisplacedHyphen));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Slug, _> = serde_json::from_str("\"silver-bangle\"");
        assert_eq!(ok.unwrap().as_str(), "silver-bangle");

        let bad: Result<Slug, _> = serde_json::from_str("\"Silver Bangle\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_display() {
        let slug = Slug::parse("pearl-earrings").unwrap();
        assert_eq!(format!("{slug}"), "pearl-earrings");
    }
}
