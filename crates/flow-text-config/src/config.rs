// crates/flow-text-config/src/config.rs
// ============================================================================
// Module: Flow Text Configuration
// Description: Configuration loading and validation for the flow text registry.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: flow-text-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! It names the locale bundles to load, the fallback chain, load limits, and
//! where audit events go. Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use flow_text_core::LoadLimits;
use flow_text_core::LocaleCode;
use flow_text_core::bundle::DEFAULT_MAX_BUNDLE_BYTES;
use flow_text_core::bundle::DEFAULT_MAX_ENTRIES;
use flow_text_core::bundle::DEFAULT_MAX_KEY_BYTES;
use flow_text_core::bundle::DEFAULT_MAX_TEMPLATE_BYTES;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "flow-text.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "FLOW_TEXT_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured bundles.
pub(crate) const MAX_BUNDLES: usize = 64;
/// Maximum number of fallback locales.
pub(crate) const MAX_FALLBACK_LOCALES: usize = 16;
/// Hard ceiling for `limits.max_bundle_bytes`.
pub(crate) const MAX_BUNDLE_BYTES_CEILING: usize = 8 * 1024 * 1024;
/// Hard ceiling for `limits.max_template_bytes`.
pub(crate) const MAX_TEMPLATE_BYTES_CEILING: usize = 256 * 1024;
/// Hard ceiling for `limits.max_entries`.
pub(crate) const MAX_ENTRIES_CEILING: usize = 65_536;
/// Hard ceiling for `limits.max_key_bytes`.
pub(crate) const MAX_KEY_BYTES_CEILING: usize = 255;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Flow text registry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowTextConfig {
    /// Locale selection and fallback behavior.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Bundle load limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Audit output configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Locale bundles to load.
    #[serde(default)]
    pub bundles: Vec<BundleSourceConfig>,
    /// Directory containing the config file, used to resolve relative paths.
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

/// Locale selection configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    /// Locale served when a caller does not ask for one.
    #[serde(default)]
    pub default_locale: LocaleCode,
    /// Locales tried after the requested locale and its base language.
    #[serde(default)]
    pub fallback_locales: Vec<LocaleCode>,
    /// Substitute the embedded English bundle when configured bundles fail.
    #[serde(default)]
    pub embedded_fallback: bool,
}

/// Bundle load limits.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitsConfig {
    /// Maximum bundle document size in bytes.
    #[serde(default = "default_max_bundle_bytes")]
    pub max_bundle_bytes: usize,
    /// Maximum size of a single template in bytes.
    #[serde(default = "default_max_template_bytes")]
    pub max_template_bytes: usize,
    /// Maximum number of templates per bundle.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Maximum key length in bytes.
    #[serde(default = "default_max_key_bytes")]
    pub max_key_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_bundle_bytes: default_max_bundle_bytes(),
            max_template_bytes: default_max_template_bytes(),
            max_entries: default_max_entries(),
            max_key_bytes: default_max_key_bytes(),
        }
    }
}

/// Audit output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines). Stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

/// One locale bundle on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleSourceConfig {
    /// Locale the bundle provides.
    pub locale: LocaleCode,
    /// Bundle file path, relative to the config file when not absolute.
    pub path: String,
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl FlowTextConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source_dir = resolved.parent().map(Path::to_path_buf);
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.audit.validate()?;
        if self.bundles.is_empty() {
            return Err(ConfigError::Invalid("bundles must list at least one bundle".to_string()));
        }
        if self.bundles.len() > MAX_BUNDLES {
            return Err(ConfigError::Invalid("bundles too many entries".to_string()));
        }
        let mut locales = BTreeSet::new();
        for bundle in &self.bundles {
            validate_path_string("bundles.path", &bundle.path)?;
            if !locales.insert(&bundle.locale) {
                return Err(ConfigError::Invalid(format!(
                    "bundles.locale {} configured more than once",
                    bundle.locale
                )));
            }
        }
        self.registry.validate(&locales)
    }

    /// Returns the bundle load limits.
    #[must_use]
    pub const fn load_limits(&self) -> LoadLimits {
        self.limits.to_load_limits()
    }

    /// Resolves a configured path against the config file directory.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path.trim());
        match &self.source_dir {
            Some(dir) if candidate.is_relative() => dir.join(candidate),
            _ => candidate.to_path_buf(),
        }
    }
}

impl RegistryConfig {
    /// Validates locale selection against the configured bundle locales.
    fn validate(&self, configured: &BTreeSet<&LocaleCode>) -> Result<(), ConfigError> {
        if !configured.contains(&self.default_locale) {
            return Err(ConfigError::Invalid(format!(
                "registry.default_locale {} has no configured bundle",
                self.default_locale
            )));
        }
        if self.fallback_locales.len() > MAX_FALLBACK_LOCALES {
            return Err(ConfigError::Invalid(
                "registry.fallback_locales too many entries".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for locale in &self.fallback_locales {
            if !seen.insert(locale) {
                return Err(ConfigError::Invalid(format!(
                    "registry.fallback_locales lists {locale} more than once"
                )));
            }
            if !configured.contains(locale) {
                return Err(ConfigError::Invalid(format!(
                    "registry.fallback_locales {locale} has no configured bundle"
                )));
            }
        }
        Ok(())
    }
}

impl LimitsConfig {
    /// Validates limits against hard ceilings.
    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("limits.max_bundle_bytes", self.max_bundle_bytes, MAX_BUNDLE_BYTES_CEILING),
            ("limits.max_template_bytes", self.max_template_bytes, MAX_TEMPLATE_BYTES_CEILING),
            ("limits.max_entries", self.max_entries, MAX_ENTRIES_CEILING),
            ("limits.max_key_bytes", self.max_key_bytes, MAX_KEY_BYTES_CEILING),
        ];
        for (field, value, ceiling) in checks {
            if value == 0 || value > ceiling {
                return Err(ConfigError::Invalid(format!("{field} out of range")));
            }
        }
        Ok(())
    }

    /// Converts to the core load limits.
    #[must_use]
    pub const fn to_load_limits(&self) -> LoadLimits {
        LoadLimits {
            max_bundle_bytes: self.max_bundle_bytes,
            max_template_bytes: self.max_template_bytes,
            max_entries: self.max_entries,
            max_key_bytes: self.max_key_bytes,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from an explicit argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default bundle size limit.
const fn default_max_bundle_bytes() -> usize {
    DEFAULT_MAX_BUNDLE_BYTES
}

/// Default template size limit.
const fn default_max_template_bytes() -> usize {
    DEFAULT_MAX_TEMPLATE_BYTES
}

/// Default template count limit.
const fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

/// Default key length limit.
const fn default_max_key_bytes() -> usize {
    DEFAULT_MAX_KEY_BYTES
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
