// crates/flow-text-core/src/embedded.rs
// ============================================================================
// Module: Embedded Default Bundle
// Description: Compiled-in English strings for the Nest setup wizard.
// Purpose: Provide a last-resort bundle when configured bundles fail to load.
// Dependencies: crate::{bundle, error, identifiers}
// ============================================================================

//! ## Overview
//! The English Nest flow strings ship inside the binary so a host can keep
//! rendering its wizard when no translation directory is available.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::bundle::LocaleBundle;
use crate::error::RegistryError;
use crate::identifiers::LocaleCode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Locale tag of the embedded bundle.
pub const EMBEDDED_LOCALE: &str = crate::identifiers::DEFAULT_LOCALE;

/// Source document of the embedded bundle.
pub const EMBEDDED_SOURCE: &str = include_str!("../bundles/nest/en.json");

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Returns the embedded locale code.
///
/// # Errors
///
/// Returns [`RegistryError::MalformedBundle`] if the embedded locale tag is invalid.
pub fn embedded_locale() -> Result<LocaleCode, RegistryError> {
    LocaleCode::parse(EMBEDDED_LOCALE).map_err(|err| RegistryError::MalformedBundle(err.to_string()))
}

/// Parses the embedded English bundle.
///
/// # Errors
///
/// Returns [`RegistryError::MalformedBundle`] if the embedded document is invalid.
pub fn default_bundle() -> Result<LocaleBundle, RegistryError> {
    LocaleBundle::load(embedded_locale()?, EMBEDDED_SOURCE)
}
