// crates/flow-text-core/src/registry.rs
// ============================================================================
// Module: Flow Text Resolution
// Description: Step lookup, placeholder substitution, and fallback chains.
// Purpose: Resolve (section, group, step) keys into display-ready text.
// Dependencies: crate::{bundle, error, template}, serde
// ============================================================================

//! ## Overview
//! Resolution is a pure function of a bundle, a composite key, and a
//! parameter map. Identical inputs always produce identical output.
//!
//! ## Missing parameters
//! A template that references an unsupplied placeholder always fails with
//! [`RegistryError::MissingParameter`]; a degraded string with the token left
//! in place is never returned.
//!
//! ## Fallback
//! [`resolve_first`] walks an ordered sequence of bundles and moves on only
//! when a bundle does not know the step.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::bundle::LocaleBundle;
use crate::bundle::StepText;
use crate::error::RegistryError;
use crate::template::Params;

// ============================================================================
// SECTION: Resolved Output
// ============================================================================

/// Fully substituted text for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedText {
    /// Resolved title, if the step declares one.
    pub title: Option<String>,
    /// Resolved description (or bare message), if declared.
    pub description: Option<String>,
    /// Resolved field labels in declaration order.
    pub fields: Vec<ResolvedField>,
}

/// Fully substituted text for one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
    /// Field identifier.
    pub id: String,
    /// Resolved field label.
    pub label: String,
    /// Resolved helper text, if declared.
    pub description: Option<String>,
}

impl ResolvedText {
    /// Returns the resolved label for a field.
    #[must_use]
    pub fn field_label(&self, field_id: &str) -> Option<&str> {
        self.fields.iter().find(|field| field.id == field_id).map(|field| field.label.as_str())
    }
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Finds a step or reports the dotted key path as unknown.
fn find_step<'a>(
    bundle: &'a LocaleBundle,
    section: &str,
    group: &str,
    step_id: &str,
) -> Result<&'a StepText, RegistryError> {
    bundle
        .section(section)
        .and_then(|found| found.group(group))
        .and_then(|found| found.step(step_id))
        .ok_or_else(|| RegistryError::UnknownStep(format!("{section}.{group}.{step_id}")))
}

/// Resolves a step's title, description, and field labels.
///
/// # Errors
///
/// Returns [`RegistryError::UnknownStep`] when the step is absent and
/// [`RegistryError::MissingParameter`] when a placeholder is unsupplied.
pub fn resolve(
    bundle: &LocaleBundle,
    section: &str,
    group: &str,
    step_id: &str,
    params: &Params,
) -> Result<ResolvedText, RegistryError> {
    let step = find_step(bundle, section, group, step_id)?;
    let title = step.title().map(|template| template.render(params)).transpose()?;
    let description = step.description().map(|template| template.render(params)).transpose()?;
    let fields = step
        .fields()
        .map(|(id, label)| -> Result<ResolvedField, RegistryError> {
            let label = label.render(params)?;
            let description = step
                .field_description(id)
                .map(|template| template.render(params))
                .transpose()?;
            Ok(ResolvedField {
                id: id.to_string(),
                label,
                description,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResolvedText {
        title,
        description,
        fields,
    })
}

/// Resolves a flat template declared directly under a section
/// (for example `application_credentials.description`).
///
/// # Errors
///
/// Returns [`RegistryError::UnknownStep`] when the key is absent and
/// [`RegistryError::MissingParameter`] when a placeholder is unsupplied.
pub fn resolve_text(
    bundle: &LocaleBundle,
    section: &str,
    key: &str,
    params: &Params,
) -> Result<String, RegistryError> {
    bundle
        .section(section)
        .and_then(|found| found.text(key))
        .ok_or_else(|| RegistryError::UnknownStep(format!("{section}.{key}")))?
        .render(params)
}

/// Lists a step's field ids in declaration order.
///
/// # Errors
///
/// Returns [`RegistryError::UnknownStep`] when the step is absent.
pub fn list_fields<'a>(
    bundle: &'a LocaleBundle,
    section: &str,
    group: &str,
    step_id: &str,
) -> Result<Vec<&'a str>, RegistryError> {
    let step = find_step(bundle, section, group, step_id)?;
    Ok(step.fields().map(|(id, _)| id).collect())
}

// ============================================================================
// SECTION: Fallback Chains
// ============================================================================

/// Runs `lookup` against each bundle in order, returning the first result
/// that is not [`RegistryError::UnknownStep`].
fn first_known<'a, T, I, F>(bundles: I, unknown: String, mut lookup: F) -> Result<T, RegistryError>
where
    I: IntoIterator<Item = &'a LocaleBundle>,
    F: FnMut(&'a LocaleBundle) -> Result<T, RegistryError>,
{
    for bundle in bundles {
        match lookup(bundle) {
            Err(err) if err.is_unknown_step() => {}
            other => return other,
        }
    }
    Err(RegistryError::UnknownStep(unknown))
}

/// Resolves against an ordered sequence of bundles, returning the first
/// bundle that knows the step.
///
/// # Errors
///
/// Returns [`RegistryError::MissingParameter`] from the first bundle that
/// knows the step, or [`RegistryError::UnknownStep`] when none does.
pub fn resolve_first<'a, I>(
    bundles: I,
    section: &str,
    group: &str,
    step_id: &str,
    params: &Params,
) -> Result<ResolvedText, RegistryError>
where
    I: IntoIterator<Item = &'a LocaleBundle>,
{
    first_known(bundles, format!("{section}.{group}.{step_id}"), |bundle| {
        resolve(bundle, section, group, step_id, params)
    })
}

/// Resolves a flat section template against an ordered sequence of bundles.
///
/// # Errors
///
/// Same rules as [`resolve_first`].
pub fn resolve_text_first<'a, I>(
    bundles: I,
    section: &str,
    key: &str,
    params: &Params,
) -> Result<String, RegistryError>
where
    I: IntoIterator<Item = &'a LocaleBundle>,
{
    first_known(bundles, format!("{section}.{key}"), |bundle| {
        resolve_text(bundle, section, key, params)
    })
}

/// Lists field ids from the first bundle in the sequence that knows the step.
///
/// # Errors
///
/// Returns [`RegistryError::UnknownStep`] when no bundle knows the step.
pub fn list_fields_first<'a, I>(
    bundles: I,
    section: &str,
    group: &str,
    step_id: &str,
) -> Result<Vec<&'a str>, RegistryError>
where
    I: IntoIterator<Item = &'a LocaleBundle>,
{
    first_known(bundles, format!("{section}.{group}.{step_id}"), |bundle| {
        list_fields(bundle, section, group, step_id)
    })
}
