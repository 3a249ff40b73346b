// crates/flow-text-core/src/identifiers.rs
// ============================================================================
// Module: Flow Text Identifiers
// Description: Validated locale tags for bundle selection.
// Purpose: Provide a strongly typed, serializable locale code with a stable form.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Locale codes key every bundle in a [`crate::BundleSet`]. Unlike the opaque
//! section and step keys inside a bundle, locale codes are validated on
//! construction so fallback chains can derive a base language reliably.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted length of a locale tag in bytes.
const MAX_LOCALE_LENGTH: usize = 35;
/// Locale used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "en";

// ============================================================================
// SECTION: Locale Code
// ============================================================================

/// Locale tag identifying a bundle (for example `en`, `pt-BR`, `zh-Hans`).
///
/// # Invariants
/// - The primary subtag is 2 to 8 ASCII letters.
/// - Every following subtag is 1 to 8 ASCII alphanumerics separated by `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleCode(String);

impl LocaleCode {
    /// Parses and normalizes a locale tag. `_` separators are rewritten to `-`.
    ///
    /// # Errors
    ///
    /// Returns [`LocaleError`] when the tag is empty, too long, or malformed.
    pub fn parse(value: &str) -> Result<Self, LocaleError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LocaleError::Empty);
        }
        if trimmed.len() > MAX_LOCALE_LENGTH {
            return Err(LocaleError::TooLong(trimmed.len()));
        }
        let normalized = trimmed.replace('_', "-");
        let mut subtags = normalized.split('-');
        let primary = subtags.next().unwrap_or_default();
        if !(2 ..= 8).contains(&primary.len()) || !primary.bytes().all(|b| b.is_ascii_alphabetic())
        {
            return Err(LocaleError::Malformed(trimmed.to_string()));
        }
        for subtag in subtags {
            if !(1 ..= 8).contains(&subtag.len())
                || !subtag.bytes().all(|b| b.is_ascii_alphanumeric())
            {
                return Err(LocaleError::Malformed(trimmed.to_string()));
            }
        }
        Ok(Self(normalized))
    }

    /// Returns the locale tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the primary language subtag (`pt` for `pt-BR`).
    #[must_use]
    pub fn base_language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// Returns the locale reduced to its primary language, if it has a region.
    #[must_use]
    pub fn base_locale(&self) -> Option<Self> {
        let base = self.base_language();
        if base.len() == self.0.len() { None } else { Some(Self(base.to_string())) }
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for LocaleCode {
    fn default() -> Self {
        Self(DEFAULT_LOCALE.to_string())
    }
}

impl TryFrom<String> for LocaleCode {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for LocaleCode {
    type Error = LocaleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<LocaleCode> for String {
    fn from(value: LocaleCode) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Locale tag validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    /// Locale tag was empty.
    #[error("locale must be non-empty")]
    Empty,
    /// Locale tag exceeded the length limit.
    #[error("locale exceeds max length ({0} bytes)")]
    TooLong(usize),
    /// Locale tag did not match the subtag grammar.
    #[error("malformed locale: {0}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::LocaleCode;
    use super::LocaleError;

    #[test]
    fn parse_normalizes_underscore_separator() {
        let locale = LocaleCode::parse("pt_BR").unwrap();
        assert_eq!(locale.as_str(), "pt-BR");
        assert_eq!(locale.base_language(), "pt");
        assert_eq!(locale.base_locale(), Some(LocaleCode::parse("pt").unwrap()));
    }

    #[test]
    fn parse_accepts_script_subtag() {
        let locale = LocaleCode::parse("zh-Hans").unwrap();
        assert_eq!(locale.base_language(), "zh");
    }

    #[test]
    fn base_locale_is_none_without_region() {
        assert_eq!(LocaleCode::parse("en").unwrap().base_locale(), None);
    }

    #[test]
    fn parse_rejects_malformed_tags() {
        assert_eq!(LocaleCode::parse("  "), Err(LocaleError::Empty));
        assert!(matches!(LocaleCode::parse("e"), Err(LocaleError::Malformed(_))));
        assert!(matches!(LocaleCode::parse("en-"), Err(LocaleError::Malformed(_))));
        assert!(matches!(LocaleCode::parse("en US"), Err(LocaleError::Malformed(_))));
        assert!(matches!(LocaleCode::parse("12"), Err(LocaleError::Malformed(_))));
        assert!(matches!(LocaleCode::parse(&"a".repeat(40)), Err(LocaleError::TooLong(40))));
    }
}
