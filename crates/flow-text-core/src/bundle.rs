// crates/flow-text-core/src/bundle.rs
// ============================================================================
// Module: Locale Bundles
// Description: Typed section/group/step model and the strict bundle loader.
// Purpose: Turn a bundle document into an immutable, validated LocaleBundle.
// Dependencies: crate::{identifiers, raw, template}, indexmap, serde_json
// ============================================================================

//! ## Overview
//! A bundle document is a fixed-depth tree:
//!
//! ```text
//! section ─┬─ flat text            (application_credentials.description)
//!          └─ group ─┬─ message    (config.abort.already_configured)
//!                    └─ step {title, description, data, data_description}
//! ```
//!
//! Loading fails closed: any shape outside this tree, duplicate or invalid
//! key, brace error, or exceeded limit is reported as
//! [`RegistryError::MalformedBundle`] with the dotted path of the offending
//! node. A loaded bundle is never mutated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use indexmap::IndexMap;

use crate::error::RegistryError;
use crate::identifiers::LocaleCode;
use crate::raw::RawNode;
use crate::template::Template;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum bundle document size in bytes.
pub const DEFAULT_MAX_BUNDLE_BYTES: usize = 1024 * 1024;
/// Default maximum size of a single template in bytes.
pub const DEFAULT_MAX_TEMPLATE_BYTES: usize = 16 * 1024;
/// Default maximum number of templates in one bundle.
pub const DEFAULT_MAX_ENTRIES: usize = 4096;
/// Default maximum key length in bytes.
pub const DEFAULT_MAX_KEY_BYTES: usize = 128;

/// Step object key for the step title.
const KEY_TITLE: &str = "title";
/// Step object key for the step description.
const KEY_DESCRIPTION: &str = "description";
/// Step object key for field labels.
const KEY_DATA: &str = "data";
/// Step object key for field helper text.
const KEY_DATA_DESCRIPTION: &str = "data_description";

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Hard limits applied while loading a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLimits {
    /// Maximum document size in bytes.
    pub max_bundle_bytes: usize,
    /// Maximum size of any single template in bytes.
    pub max_template_bytes: usize,
    /// Maximum number of templates across the bundle.
    pub max_entries: usize,
    /// Maximum length of any key in bytes.
    pub max_key_bytes: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            max_bundle_bytes: DEFAULT_MAX_BUNDLE_BYTES,
            max_template_bytes: DEFAULT_MAX_TEMPLATE_BYTES,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_key_bytes: DEFAULT_MAX_KEY_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Bundle Model
// ============================================================================

/// All localized flow text for one locale.
///
/// # Invariants
/// - Immutable after [`LocaleBundle::load`]; share it through `Arc`.
/// - Sections, groups, steps, and fields keep declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleBundle {
    /// Locale served by this bundle.
    locale: LocaleCode,
    /// Sections keyed by name.
    sections: IndexMap<String, Section>,
    /// Total number of templates in the bundle.
    template_count: usize,
}

/// One top-level section such as `config` or `device_automation`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Flat templates declared directly under the section.
    texts: IndexMap<String, Template>,
    /// Step groups keyed by group kind (`abort`, `error`, `step`, ...).
    groups: IndexMap<String, StepGroup>,
}

/// Steps of one group kind within a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepGroup {
    /// Step text keyed by step identifier.
    steps: IndexMap<String, StepText>,
}

/// Display text for one step, abort reason, error code, or trigger.
///
/// # Invariants
/// - Every `data_description` key is also a `data` key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepText {
    /// Optional step title.
    title: Option<Template>,
    /// Optional description; bare message entries land here.
    description: Option<Template>,
    /// Field labels keyed by field id.
    data: IndexMap<String, Template>,
    /// Field helper text keyed by field id.
    data_description: IndexMap<String, Template>,
}

impl LocaleBundle {
    /// Loads a bundle document with the default [`LoadLimits`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MalformedBundle`] when the document violates
    /// the bundle schema.
    pub fn load(locale: LocaleCode, source: &str) -> Result<Self, RegistryError> {
        Self::load_with_limits(locale, source, &LoadLimits::default())
    }

    /// Loads a bundle document with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MalformedBundle`] when the document violates
    /// the bundle schema or exceeds `limits`.
    pub fn load_with_limits(
        locale: LocaleCode,
        source: &str,
        limits: &LoadLimits,
    ) -> Result<Self, RegistryError> {
        if source.len() > limits.max_bundle_bytes {
            return Err(RegistryError::MalformedBundle(format!(
                "bundle exceeds size limit: {} bytes (max {})",
                source.len(),
                limits.max_bundle_bytes
            )));
        }
        let root: RawNode = serde_json::from_str(source)
            .map_err(|err| RegistryError::MalformedBundle(err.to_string()))?;
        let RawNode::Map(entries) = root else {
            return Err(malformed("<root>", "bundle root must be an object"));
        };

        let mut builder = Builder {
            limits,
            template_count: 0,
        };
        let mut sections = IndexMap::with_capacity(entries.len());
        for (name, node) in entries {
            builder.check_key("", &name)?;
            let section = builder.section(&name, node)?;
            sections.insert(name, section);
        }

        Ok(Self {
            locale,
            sections,
            template_count: builder.template_count,
        })
    }

    /// Returns the bundle locale.
    #[must_use]
    pub const fn locale(&self) -> &LocaleCode {
        &self.locale
    }

    /// Returns a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Iterates sections in declaration order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, section)| (name.as_str(), section))
    }

    /// Total number of templates in the bundle.
    #[must_use]
    pub const fn template_count(&self) -> usize {
        self.template_count
    }

    /// Lists every template with its dotted path, in declaration order.
    #[must_use]
    pub fn templates(&self) -> Vec<(String, &Template)> {
        let mut out = Vec::with_capacity(self.template_count);
        for (section_name, section) in &self.sections {
            for (key, template) in &section.texts {
                out.push((format!("{section_name}.{key}"), template));
            }
            for (group_name, group) in &section.groups {
                for (step_id, step) in &group.steps {
                    let prefix = format!("{section_name}.{group_name}.{step_id}");
                    step.collect_templates(&prefix, &mut out);
                }
            }
        }
        out
    }
}

impl Section {
    /// Returns a flat template declared directly under the section.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&Template> {
        self.texts.get(key)
    }

    /// Iterates flat templates in declaration order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.texts.iter().map(|(key, template)| (key.as_str(), template))
    }

    /// Returns a step group by kind.
    #[must_use]
    pub fn group(&self, kind: &str) -> Option<&StepGroup> {
        self.groups.get(kind)
    }

    /// Iterates step groups in declaration order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &StepGroup)> {
        self.groups.iter().map(|(kind, group)| (kind.as_str(), group))
    }
}

impl StepGroup {
    /// Returns a step by identifier.
    #[must_use]
    pub fn step(&self, step_id: &str) -> Option<&StepText> {
        self.steps.get(step_id)
    }

    /// Iterates steps in declaration order.
    pub fn steps(&self) -> impl Iterator<Item = (&str, &StepText)> {
        self.steps.iter().map(|(id, step)| (id.as_str(), step))
    }

    /// Number of steps in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the group declares no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl StepText {
    /// Returns the step title template.
    #[must_use]
    pub const fn title(&self) -> Option<&Template> {
        self.title.as_ref()
    }

    /// Returns the step description template.
    #[must_use]
    pub const fn description(&self) -> Option<&Template> {
        self.description.as_ref()
    }

    /// Iterates field ids and label templates in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.data.iter().map(|(id, label)| (id.as_str(), label))
    }

    /// Returns the helper text template for a field.
    #[must_use]
    pub fn field_description(&self, field_id: &str) -> Option<&Template> {
        self.data_description.get(field_id)
    }

    /// Returns the distinct placeholders across all templates of the step,
    /// in render order.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for template in self.render_order() {
            for name in template.placeholders() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Templates in render order: title, description, then each field label
    /// followed by its helper text.
    pub(crate) fn render_order(&self) -> Vec<&Template> {
        let mut order: Vec<&Template> = self.title.iter().chain(self.description.iter()).collect();
        for (field_id, label) in &self.data {
            order.push(label);
            if let Some(help) = self.data_description.get(field_id) {
                order.push(help);
            }
        }
        order
    }

    /// Appends this step's templates with dotted paths under `prefix`.
    fn collect_templates<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Template)>) {
        if let Some(title) = &self.title {
            out.push((format!("{prefix}.{KEY_TITLE}"), title));
        }
        if let Some(description) = &self.description {
            out.push((format!("{prefix}.{KEY_DESCRIPTION}"), description));
        }
        for (field_id, label) in &self.data {
            out.push((format!("{prefix}.{KEY_DATA}.{field_id}"), label));
        }
        for (field_id, help) in &self.data_description {
            out.push((format!("{prefix}.{KEY_DATA_DESCRIPTION}.{field_id}"), help));
        }
    }
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Load-time state shared across the tree walk.
struct Builder<'a> {
    /// Limits for this load.
    limits: &'a LoadLimits,
    /// Templates accepted so far.
    template_count: usize,
}

impl Builder<'_> {
    /// Converts a raw section node.
    fn section(&mut self, name: &str, node: RawNode) -> Result<Section, RegistryError> {
        let RawNode::Map(entries) = node else {
            return Err(malformed(name, "section must be an object"));
        };
        let mut section = Section::default();
        for (key, child) in entries {
            self.check_key(name, &key)?;
            let path = format!("{name}.{key}");
            match child {
                RawNode::Text(text) => {
                    let template = self.template(&path, &text)?;
                    section.texts.insert(key, template);
                }
                RawNode::Map(steps) => {
                    let group = self.group(&path, steps)?;
                    section.groups.insert(key, group);
                }
            }
        }
        Ok(section)
    }

    /// Converts the entries of a step group.
    fn group(
        &mut self,
        path: &str,
        entries: IndexMap<String, RawNode>,
    ) -> Result<StepGroup, RegistryError> {
        let mut group = StepGroup::default();
        for (step_id, child) in entries {
            self.check_key(path, &step_id)?;
            let step_path = format!("{path}.{step_id}");
            let step = match child {
                RawNode::Text(text) => StepText {
                    description: Some(self.template(&step_path, &text)?),
                    ..StepText::default()
                },
                RawNode::Map(fields) => self.step(&step_path, fields)?,
            };
            group.steps.insert(step_id, step);
        }
        Ok(group)
    }

    /// Converts a step object.
    fn step(
        &mut self,
        path: &str,
        entries: IndexMap<String, RawNode>,
    ) -> Result<StepText, RegistryError> {
        let mut step = StepText::default();
        for (key, child) in entries {
            let child_path = format!("{path}.{key}");
            match key.as_str() {
                KEY_TITLE => step.title = Some(self.leaf(&child_path, child)?),
                KEY_DESCRIPTION => step.description = Some(self.leaf(&child_path, child)?),
                KEY_DATA => step.data = self.fields(&child_path, child)?,
                KEY_DATA_DESCRIPTION => step.data_description = self.fields(&child_path, child)?,
                _ => return Err(malformed(&child_path, "unknown step key")),
            }
        }
        if let Some(field_id) = step.data_description.keys().find(|id| !step.data.contains_key(*id))
        {
            return Err(malformed(
                &format!("{path}.{KEY_DATA_DESCRIPTION}.{field_id}"),
                "describes a field not declared in data",
            ));
        }
        Ok(step)
    }

    /// Converts a field map (`data` or `data_description`).
    fn fields(
        &mut self,
        path: &str,
        node: RawNode,
    ) -> Result<IndexMap<String, Template>, RegistryError> {
        let RawNode::Map(entries) = node else {
            return Err(malformed(path, "expected an object of field labels"));
        };
        let mut fields = IndexMap::with_capacity(entries.len());
        for (field_id, child) in entries {
            self.check_key(path, &field_id)?;
            let template = self.leaf(&format!("{path}.{field_id}"), child)?;
            fields.insert(field_id, template);
        }
        Ok(fields)
    }

    /// Converts a node that must be a string leaf.
    fn leaf(&mut self, path: &str, node: RawNode) -> Result<Template, RegistryError> {
        match node {
            RawNode::Text(text) => self.template(path, &text),
            other @ RawNode::Map(_) => Err(malformed(
                path,
                &format!("expected a string, found {}", other.kind()),
            )),
        }
    }

    /// Parses a template and enforces template limits.
    fn template(&mut self, path: &str, text: &str) -> Result<Template, RegistryError> {
        if text.len() > self.limits.max_template_bytes {
            return Err(malformed(
                path,
                &format!("template exceeds size limit ({} bytes)", self.limits.max_template_bytes),
            ));
        }
        self.template_count += 1;
        if self.template_count > self.limits.max_entries {
            return Err(malformed(
                path,
                &format!("bundle exceeds {} templates", self.limits.max_entries),
            ));
        }
        Template::parse(text).map_err(|err| malformed(path, &err.to_string()))
    }

    /// Validates a mapping key.
    fn check_key(&self, parent: &str, key: &str) -> Result<(), RegistryError> {
        let path = if parent.is_empty() { key.to_string() } else { format!("{parent}.{key}") };
        if key.is_empty() {
            return Err(malformed(&path, "key must be non-empty"));
        }
        if key.len() > self.limits.max_key_bytes {
            return Err(malformed(&path, "key exceeds max length"));
        }
        if key.chars().any(|ch| ch == '.' || ch.is_whitespace() || ch.is_control()) {
            return Err(malformed(&path, "key must not contain '.', whitespace, or control chars"));
        }
        Ok(())
    }
}

/// Builds a [`RegistryError::MalformedBundle`] for a dotted path.
fn malformed(path: &str, reason: &str) -> RegistryError {
    RegistryError::MalformedBundle(format!("{path}: {reason}"))
}
