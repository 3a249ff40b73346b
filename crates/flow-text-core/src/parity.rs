// crates/flow-text-core/src/parity.rs
// ============================================================================
// Module: Translation Parity
// Description: Compare a translated bundle against its base locale.
// Purpose: Detect missing, extra, and placeholder-mismatched templates.
// Dependencies: crate::bundle, serde
// ============================================================================

//! ## Overview
//! Translations drift: keys go missing and placeholders get renamed. A
//! [`ParityReport`] compares every template path of a candidate bundle with
//! the base bundle. A candidate whose placeholders differ from the base would
//! fail resolution with parameters collected for the base text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::bundle::LocaleBundle;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Placeholder mismatch for one template path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderMismatch {
    /// Dotted template path.
    pub path: String,
    /// Placeholders declared by the base template.
    pub expected: BTreeSet<String>,
    /// Placeholders declared by the candidate template.
    pub actual: BTreeSet<String>,
}

/// Differences between a candidate bundle and its base bundle.
///
/// # Invariants
/// - All path lists are sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParityReport {
    /// Base locale tag.
    pub base: String,
    /// Candidate locale tag.
    pub candidate: String,
    /// Template paths in the base but not the candidate.
    pub missing: Vec<String>,
    /// Template paths in the candidate but not the base.
    pub extra: Vec<String>,
    /// Shared paths whose placeholder sets differ.
    pub mismatched: Vec<PlaceholderMismatch>,
    /// Fraction of base templates present in the candidate (0.0 to 1.0).
    pub coverage: f64,
}

impl ParityReport {
    /// Compares `candidate` against `base`.
    #[must_use]
    pub fn compare(base: &LocaleBundle, candidate: &LocaleBundle) -> Self {
        let base_map = placeholder_map(base);
        let candidate_map = placeholder_map(candidate);

        let missing: Vec<String> =
            base_map.keys().filter(|path| !candidate_map.contains_key(*path)).cloned().collect();
        let extra: Vec<String> =
            candidate_map.keys().filter(|path| !base_map.contains_key(*path)).cloned().collect();
        let mismatched = base_map
            .iter()
            .filter_map(|(path, expected)| {
                let actual = candidate_map.get(path)?;
                (actual != expected).then(|| PlaceholderMismatch {
                    path: path.clone(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                })
            })
            .collect();

        let total = base_map.len();
        let present = total - missing.len();
        let coverage = if total == 0 { 1.0 } else { ratio(present, total) };

        Self {
            base: base.locale().to_string(),
            candidate: candidate.locale().to_string(),
            missing,
            extra,
            mismatched,
            coverage,
        }
    }

    /// Whether the candidate is complete and placeholder-compatible.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.mismatched.is_empty()
    }
}

/// Maps every template path to its placeholder set.
fn placeholder_map(bundle: &LocaleBundle) -> BTreeMap<String, BTreeSet<String>> {
    bundle
        .templates()
        .into_iter()
        .map(|(path, template)| {
            let names = template.placeholders().into_iter().map(str::to_string).collect();
            (path, names)
        })
        .collect()
}

/// Computes `part / whole` as a float.
#[allow(clippy::cast_precision_loss, reason = "Template counts are far below 2^52.")]
fn ratio(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64
}
