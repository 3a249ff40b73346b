// crates/flow-text-config/src/loader.rs
// ============================================================================
// Module: Bundle Loader
// Description: Reads configured locale bundles from disk into a bundle store.
// Purpose: Turn a validated config into a live, audited `BundleStore`.
// Dependencies: flow-text-core, thiserror
// ============================================================================

//! ## Overview
//! The loader reads each configured bundle with a size guard, parses it with
//! the configured limits, and assembles a [`BundleSet`]. Every load outcome is
//! reported to the audit sink. With `registry.embedded_fallback` enabled,
//! failed bundles are skipped and the embedded English bundle fills in.
//!
//! ## Invariants
//! - The default locale always has a bundle in a successfully built set.
//! - Reloads build a complete new set before swapping it in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use flow_text_core::BundleSet;
use flow_text_core::BundleStore;
use flow_text_core::FileAuditSink;
use flow_text_core::LoadLimits;
use flow_text_core::LocaleBundle;
use flow_text_core::LocaleCode;
use flow_text_core::NoopAuditSink;
use flow_text_core::RegistryAuditEvent;
use flow_text_core::RegistryAuditSink;
use flow_text_core::RegistryError;
use flow_text_core::StderrAuditSink;
use flow_text_core::StoreError;
use flow_text_core::audit::EVENT_BUNDLE_EMBEDDED;
use flow_text_core::audit::EVENT_BUNDLE_LOAD_FAILED;
use flow_text_core::audit::EVENT_BUNDLE_LOADED;
use flow_text_core::embedded;
use thiserror::Error;

use crate::config::FlowTextConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading bundles from disk.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Bundle file could not be read.
    #[error("bundle io error for {locale}: {message}")]
    Io {
        /// Locale of the bundle being read.
        locale: String,
        /// Underlying I/O failure.
        message: String,
    },
    /// Bundle file was read but failed validation.
    #[error("bundle {locale} failed to load: {source}")]
    Bundle {
        /// Locale of the rejected bundle.
        locale: String,
        /// Validation failure.
        source: RegistryError,
    },
    /// No bundle is available for the configured default locale.
    #[error("default locale {0} has no loaded bundle")]
    MissingDefaultLocale(String),
    /// Audit sink could not be opened.
    #[error("audit sink error: {0}")]
    Audit(String),
    /// Bundle store rejected the swap.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Loads every configured bundle into a new store wired to the configured
/// audit sink.
///
/// # Errors
///
/// Returns [`LoaderError`] when a bundle cannot be loaded (and embedded
/// fallback is disabled), the default locale is missing, or the audit log
/// cannot be opened.
pub fn load_store(config: &FlowTextConfig) -> Result<BundleStore, LoaderError> {
    let audit = build_audit_sink(config)?;
    let set = build_bundle_set(config, audit.as_ref())?;
    Ok(BundleStore::with_audit_sink(set, audit))
}

/// Rebuilds the bundle set from `config` and swaps it into `store`,
/// returning the previous set. On error the store keeps serving the old set.
///
/// # Errors
///
/// Returns [`LoaderError`] when the new set cannot be built or swapped.
pub fn reload_store(
    store: &BundleStore,
    config: &FlowTextConfig,
) -> Result<Arc<BundleSet>, LoaderError> {
    let audit = store.audit_sink();
    let set = build_bundle_set(config, audit.as_ref())?;
    Ok(store.replace(set)?)
}

/// Reads and validates every configured bundle.
///
/// # Errors
///
/// Returns [`LoaderError`] when a bundle cannot be loaded (and embedded
/// fallback is disabled) or the default locale is missing.
pub fn build_bundle_set(
    config: &FlowTextConfig,
    audit: &dyn RegistryAuditSink,
) -> Result<BundleSet, LoaderError> {
    let limits = config.load_limits();
    let mut set = BundleSet::new(config.registry.fallback_locales.clone());
    for source in &config.bundles {
        let path = config.resolve_path(&source.path);
        match read_bundle(&path, &source.locale, &limits) {
            Ok(bundle) => {
                audit.record(
                    &RegistryAuditEvent::new(EVENT_BUNDLE_LOADED)
                        .with_locale(source.locale.to_string())
                        .with_templates(bundle.template_count()),
                );
                set.insert(Arc::new(bundle));
            }
            Err(err) => {
                audit.record(
                    &RegistryAuditEvent::new(EVENT_BUNDLE_LOAD_FAILED)
                        .with_locale(source.locale.to_string())
                        .with_error(err.to_string()),
                );
                if !config.registry.embedded_fallback {
                    return Err(err);
                }
            }
        }
    }
    if config.registry.embedded_fallback {
        let fallback = embedded::default_bundle().map_err(|source| LoaderError::Bundle {
            locale: embedded::EMBEDDED_LOCALE.to_string(),
            source,
        })?;
        if !set.contains(fallback.locale()) {
            audit.record(
                &RegistryAuditEvent::new(EVENT_BUNDLE_EMBEDDED)
                    .with_locale(fallback.locale().to_string())
                    .with_templates(fallback.template_count()),
            );
            set.insert(Arc::new(fallback));
        }
    }
    let default_locale = &config.registry.default_locale;
    if !set.contains(default_locale) {
        return Err(LoaderError::MissingDefaultLocale(default_locale.to_string()));
    }
    Ok(set)
}

/// Builds the audit sink named by the config.
///
/// # Errors
///
/// Returns [`LoaderError::Audit`] when the audit log file cannot be opened.
pub fn build_audit_sink(
    config: &FlowTextConfig,
) -> Result<Arc<dyn RegistryAuditSink>, LoaderError> {
    if !config.audit.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.audit.path {
        Some(path) => {
            let sink = FileAuditSink::new(&config.resolve_path(path))
                .map_err(|err| LoaderError::Audit(err.to_string()))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads one bundle file, refusing to buffer more than the size limit.
fn read_bundle(
    path: &Path,
    locale: &LocaleCode,
    limits: &LoadLimits,
) -> Result<LocaleBundle, LoaderError> {
    let io_error = |err: io::Error| LoaderError::Io {
        locale: locale.to_string(),
        message: err.to_string(),
    };
    let file = File::open(path).map_err(io_error)?;
    let cap = u64::try_from(limits.max_bundle_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    file.take(cap).read_to_end(&mut bytes).map_err(io_error)?;
    if bytes.len() > limits.max_bundle_bytes {
        return Err(malformed(
            locale,
            format!("bundle exceeds size limit: max {} bytes", limits.max_bundle_bytes),
        ));
    }
    let source = std::str::from_utf8(&bytes)
        .map_err(|_| malformed(locale, "bundle must be utf-8".to_string()))?;
    LocaleBundle::load_with_limits(locale.clone(), source, limits).map_err(|source| {
        LoaderError::Bundle {
            locale: locale.to_string(),
            source,
        }
    })
}

/// Wraps a load-time violation for `locale`.
fn malformed(locale: &LocaleCode, message: String) -> LoaderError {
    LoaderError::Bundle {
        locale: locale.to_string(),
        source: RegistryError::MalformedBundle(message),
    }
}
