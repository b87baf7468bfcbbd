//! Name slugs used for exact-name lookup.
//!
//! A slug is the URL-friendly form of a customer name: `Jane Doe` becomes
//! `jane-doe`. Lookup reverses the transformation (lowercase, hyphens to
//! spaces) and compares against the lowercased stored name, so a name that
//! itself contains a hyphen can never be matched by slug.

use core::fmt;

/// Errors that can occur when parsing a [`NameSlug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The slug is empty or whitespace only.
    #[error("name slug cannot be empty")]
    Empty,
}

/// A lowercase, hyphen-delimited stand-in for a customer name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameSlug(String);

impl NameSlug {
    /// Parse a slug as received in a `?name=` query parameter.
    ///
    /// The input is lowercased; it is otherwise kept as-is so that
    /// `jane doe` and `jane-doe` both resolve to the same name.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the input is blank.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SlugError::Empty);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Build a slug from a display name (`Jane Doe` -> `jane-doe`).
    ///
    /// Runs of whitespace collapse into a single hyphen.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the name is blank.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let slug = name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        if slug.is_empty() {
            return Err(SlugError::Empty);
        }
        Ok(Self(slug))
    }

    /// The slug text, e.g. `jane-doe`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lowercase name this slug matches, e.g. `jane doe`.
    #[must_use]
    pub fn to_name_key(&self) -> String {
        self.0.replace('-', " ")
    }
}

impl fmt::Display for NameSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NameSlug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
