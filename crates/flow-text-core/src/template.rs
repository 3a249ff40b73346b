// crates/flow-text-core/src/template.rs
// ============================================================================
// Module: Flow Text Templates
// Description: Placeholder template parsing and single-pass substitution.
// Purpose: Validate `{name}` tokens at load time and render them at resolve time.
// Dependencies: crate::error
// ============================================================================

//! ## Overview
//! Templates are parsed once when a bundle loads into literal and placeholder
//! segments, so brace errors surface as [`RegistryError::MalformedBundle`]
//! instead of at render time.
//!
//! ## Syntax
//! - `{identifier}` is a placeholder; identifiers use `[A-Za-z0-9_]+`.
//! - `{{` renders a literal `{` and `}}` renders a literal `}`.
//! - Any other brace is rejected.
//!
//! ## Invariants
//! - Rendering is a single left-to-right pass; substituted values are copied
//!   verbatim and never rescanned for placeholders.
//! - Rendering fails on the first placeholder without a parameter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::error::RegistryError;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Runtime parameters substituted into templates (placeholder name → value).
///
/// # Invariants
/// - Entries not referenced by a template are ignored during rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    /// Parameter values keyed by placeholder name.
    values: BTreeMap<String, String>,
}

impl Params {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter and returns the updated map.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value for `name`, if supplied.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of supplied parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameters were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ============================================================================
// SECTION: Template
// ============================================================================

/// A single parsed template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, with `{{`/`}}` escapes already collapsed.
    Literal(String),
    /// Placeholder name without braces.
    Placeholder(String),
}

/// Parsed template string.
///
/// # Invariants
/// - Adjacent literals are merged; placeholders are valid identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Original source text as declared in the bundle.
    source: String,
    /// Parsed segments in source order.
    segments: Vec<Segment>,
}

impl Template {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when a brace is unmatched or a placeholder
    /// name is empty or contains characters outside `[A-Za-z0-9_]`.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((index, ch)) = chars.next() {
            match ch {
                '{' => {
                    if chars.next_if(|&(_, next)| next == '{').is_some() {
                        literal.push('{');
                        continue;
                    }
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, next) in chars.by_ref() {
                        if next == '}' {
                            closed = true;
                            break;
                        }
                        if next == '{' {
                            return Err(TemplateError::UnmatchedOpen(index));
                        }
                        name.push(next);
                    }
                    if !closed {
                        return Err(TemplateError::UnmatchedOpen(index));
                    }
                    if !is_placeholder_name(&name) {
                        return Err(TemplateError::InvalidPlaceholder {
                            offset: index,
                            name,
                        });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => {
                    if chars.next_if(|&(_, next)| next == '}').is_some() {
                        literal.push('}');
                    } else {
                        return Err(TemplateError::UnmatchedClose(index));
                    }
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Returns the template source as declared.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the distinct placeholder names in order of first appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment
                && !names.contains(&name.as_str())
            {
                names.push(name);
            }
        }
        names
    }

    /// Renders the template with `params`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingParameter`] naming the first
    /// placeholder without a supplied value.
    pub fn render(&self, params: &Params) -> Result<String, RegistryError> {
        let mut output = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| RegistryError::MissingParameter(name.clone()))?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }
}

/// Returns true when `name` is a valid placeholder identifier.
fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Template syntax errors. Offsets are byte offsets into the template source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// An opening brace has no matching closing brace.
    #[error("unmatched '{{' at byte {0}")]
    UnmatchedOpen(usize),
    /// A closing brace has no matching opening brace.
    #[error("unmatched '}}' at byte {0}")]
    UnmatchedClose(usize),
    /// Placeholder name is empty or uses characters outside `[A-Za-z0-9_]`.
    #[error("invalid placeholder '{name}' at byte {offset}")]
    InvalidPlaceholder {
        /// Byte offset of the opening brace.
        offset: usize,
        /// Offending placeholder name.
        name: String,
    },
}

// ============================================================================
// SECTION: Tests
// ============================================================================
