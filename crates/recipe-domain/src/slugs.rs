//! Slug normalization for ingredient identifiers
//!
//! Every ingredient identifier that crosses a comparison boundary goes through
//! [`normalize_slug`]:
//! - Lowercase conversion
//! - Each run of characters outside `[a-z0-9]` becomes one hyphen
//! - Leading/trailing hyphens removed
//!
//! [`IngredientSlug`] wraps the normalized form. Its constructors (serde
//! included) always normalize, so a slug holding anything other than
//! `[a-z0-9]` words joined by single hyphens cannot be built.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Normalize arbitrary text into slug form.
///
/// Total: never fails. Empty (or all-punctuation) input yields an empty string.
///
/// # Examples
///
/// ```
/// use recipe_domain::slugs::normalize_slug;
///
/// assert_eq!(normalize_slug("Chicken Breasts"), "chicken-breasts");
/// assert_eq!(normalize_slug("  Salt & Pepper!  "), "salt-pepper");
/// assert_eq!(normalize_slug("--"), "");
/// ```
pub fn normalize_slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c);
        } else {
            pending_separator = true;
        }
    }

    out
}

/// A normalized ingredient identifier, used as an opaque comparison key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct IngredientSlug(String);

impl IngredientSlug {
    /// Normalize `text` into a slug.
    pub fn new(text: &str) -> Self {
        Self(normalize_slug(text))
    }

    /// Join words with hyphens. Words are re-normalized, so any token source is safe.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let joined = tokens.into_iter().collect::<Vec<_>>().join("-");
        Self::new(&joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes. Slugs are ASCII, so this is also the character count.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hyphen-separated words of the slug.
    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.split('-').filter(|t| !t.is_empty())
    }

    /// Space-separated phrase form, as consumed by morphology helpers.
    pub fn to_phrase(&self) -> String {
        self.0.replace('-', " ")
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for IngredientSlug {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for IngredientSlug {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<IngredientSlug> for String {
    fn from(value: IngredientSlug) -> Self {
        value.0
    }
}

impl AsRef<str> for IngredientSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IngredientSlug {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for IngredientSlug {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for IngredientSlug {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for IngredientSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
