// crates/flow-text-core/src/error.rs
// ============================================================================
// Module: Flow Text Errors
// Description: Error taxonomy for bundle loading and text resolution.
// Purpose: Return every failure as an explicit, matchable value.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The registry never logs or retries; all recovery policy lives with the
//! caller. [`RegistryError::UnknownStep`] is the only variant fallback chains
//! recover from.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Bundle loading and resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Bundle document violated the section/group/step schema.
    #[error("malformed bundle: {0}")]
    MalformedBundle(String),
    /// Requested section, group, or step is not present (dotted key path).
    #[error("unknown step: {0}")]
    UnknownStep(String),
    /// Template references a placeholder that was not supplied.
    #[error("missing parameter: {0}")]
    MissingParameter(String),
}

impl RegistryError {
    /// Returns true for errors a fallback bundle may recover from.
    #[must_use]
    pub const fn is_unknown_step(&self) -> bool {
        matches!(self, Self::UnknownStep(_))
    }
}

/// Bundle store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A writer panicked while holding the store lock.
    #[error("bundle store lock poisoned")]
    Poisoned,
}
