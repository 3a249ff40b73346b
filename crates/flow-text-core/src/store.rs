// crates/flow-text-core/src/store.rs
// ============================================================================
// Module: Bundle Store
// Description: Locale bundle sets with fallback chains and atomic replacement.
// Purpose: Share immutable bundles across readers with copy-on-write reloads.
// Dependencies: crate::{audit, bundle, error, identifiers, registry, template}
// ============================================================================

//! ## Overview
//! A [`BundleSet`] maps locales to immutable bundles and knows the configured
//! fallback chain. A [`BundleStore`] holds the current set behind a lock and
//! swaps it as a whole: readers take an `Arc` snapshot and never observe a
//! partially updated set.
//!
//! ## Invariants
//! - Bundles are never mutated in place; reloads build a new set.
//! - Only writers take the write lock, and they hold it for the swap only.
//! - Each swap increments the store generation and emits one audit event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;

use crate::audit::EVENT_BUNDLE_RELOADED;
use crate::audit::EVENT_BUNDLE_SET_REPLACED;
use crate::audit::NoopAuditSink;
use crate::audit::RegistryAuditEvent;
use crate::audit::RegistryAuditSink;
use crate::bundle::LocaleBundle;
use crate::error::RegistryError;
use crate::error::StoreError;
use crate::identifiers::LocaleCode;
use crate::registry::ResolvedText;
use crate::registry::list_fields_first;
use crate::registry::resolve_first;
use crate::registry::resolve_text_first;
use crate::template::Params;

// ============================================================================
// SECTION: Bundle Set
// ============================================================================

/// Immutable collection of locale bundles plus the fallback chain.
#[derive(Debug, Clone, Default)]
pub struct BundleSet {
    /// Bundles keyed by locale.
    bundles: BTreeMap<LocaleCode, Arc<LocaleBundle>>,
    /// Locales tried after the requested locale and its base language.
    fallback: Vec<LocaleCode>,
}

impl BundleSet {
    /// Creates an empty set with the given fallback chain.
    #[must_use]
    pub const fn new(fallback: Vec<LocaleCode>) -> Self {
        Self {
            bundles: BTreeMap::new(),
            fallback,
        }
    }

    /// Adds a bundle and returns the updated set.
    #[must_use]
    pub fn with_bundle(mut self, bundle: LocaleBundle) -> Self {
        self.insert(Arc::new(bundle));
        self
    }

    /// Inserts a bundle, returning the bundle it replaced.
    pub fn insert(&mut self, bundle: Arc<LocaleBundle>) -> Option<Arc<LocaleBundle>> {
        self.bundles.insert(bundle.locale().clone(), bundle)
    }

    /// Returns the bundle for an exact locale.
    #[must_use]
    pub fn get(&self, locale: &LocaleCode) -> Option<&Arc<LocaleBundle>> {
        self.bundles.get(locale)
    }

    /// Whether a bundle is loaded for `locale`.
    #[must_use]
    pub fn contains(&self, locale: &LocaleCode) -> bool {
        self.bundles.contains_key(locale)
    }

    /// Loaded locales in sorted order.
    pub fn locales(&self) -> impl Iterator<Item = &LocaleCode> {
        self.bundles.keys()
    }

    /// Configured fallback chain.
    #[must_use]
    pub fn fallback(&self) -> &[LocaleCode] {
        &self.fallback
    }

    /// Total templates across all bundles.
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.bundles.values().map(|bundle| bundle.template_count()).sum()
    }

    /// Bundles to try for `locale`: the locale itself, its base language,
    /// then the fallback chain. Unloaded and repeated locales are skipped.
    #[must_use]
    pub fn chain_for(&self, locale: &LocaleCode) -> Vec<&LocaleBundle> {
        let mut seen: Vec<&LocaleCode> = Vec::new();
        let mut chain = Vec::new();
        let base = locale.base_locale();
        let candidates = std::iter::once(locale).chain(base.as_ref()).chain(self.fallback.iter());
        for candidate in candidates {
            if seen.contains(&candidate) {
                continue;
            }
            seen.push(candidate);
            if let Some(bundle) = self.bundles.get(candidate) {
                chain.push(bundle.as_ref());
            }
        }
        chain
    }

    /// Resolves a step for `locale`, walking the fallback chain.
    ///
    /// # Errors
    ///
    /// See [`resolve_first`].
    pub fn resolve(
        &self,
        locale: &LocaleCode,
        section: &str,
        group: &str,
        step_id: &str,
        params: &Params,
    ) -> Result<ResolvedText, RegistryError> {
        resolve_first(self.chain_for(locale), section, group, step_id, params)
    }

    /// Resolves a flat section template for `locale`, walking the chain.
    ///
    /// # Errors
    ///
    /// See [`resolve_text_first`].
    pub fn resolve_text(
        &self,
        locale: &LocaleCode,
        section: &str,
        key: &str,
        params: &Params,
    ) -> Result<String, RegistryError> {
        resolve_text_first(self.chain_for(locale), section, key, params)
    }

    /// Lists field ids for `locale`, walking the chain.
    ///
    /// # Errors
    ///
    /// See [`list_fields_first`].
    pub fn list_fields(
        &self,
        locale: &LocaleCode,
        section: &str,
        group: &str,
        step_id: &str,
    ) -> Result<Vec<&str>, RegistryError> {
        list_fields_first(self.chain_for(locale), section, group, step_id)
    }

    /// Locale labels for audit events.
    fn locale_labels(&self) -> Vec<String> {
        self.bundles.keys().map(ToString::to_string).collect()
    }
}

// ============================================================================
// SECTION: Bundle Store
// ============================================================================

/// Current bundle set and its generation, guarded together.
struct Current {
    /// Active bundle set.
    set: Arc<BundleSet>,
    /// Number of swaps performed since construction.
    generation: u64,
}

/// Process-wide handle to the active bundle set.
///
/// # Invariants
/// - Readers see either the previous set or the next set, never a mix.
pub struct BundleStore {
    /// Active set behind a single-writer lock.
    current: RwLock<Current>,
    /// Audit sink for swap events.
    audit: Arc<dyn RegistryAuditSink>,
}

impl BundleStore {
    /// Creates a store without audit output.
    #[must_use]
    pub fn new(set: BundleSet) -> Self {
        Self::with_audit_sink(set, Arc::new(NoopAuditSink))
    }

    /// Creates a store that reports swaps to `audit`.
    #[must_use]
    pub fn with_audit_sink(set: BundleSet, audit: Arc<dyn RegistryAuditSink>) -> Self {
        Self {
            current: RwLock::new(Current {
                set: Arc::new(set),
                generation: 0,
            }),
            audit,
        }
    }

    /// Returns the audit sink swaps are reported to.
    #[must_use]
    pub fn audit_sink(&self) -> Arc<dyn RegistryAuditSink> {
        Arc::clone(&self.audit)
    }

    /// Returns the active set. The snapshot stays valid across later swaps.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when a writer panicked mid-swap.
    pub fn snapshot(&self) -> Result<Arc<BundleSet>, StoreError> {
        let guard = self.current.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Arc::clone(&guard.set))
    }

    /// Returns the number of swaps performed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when a writer panicked mid-swap.
    pub fn generation(&self) -> Result<u64, StoreError> {
        let guard = self.current.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.generation)
    }

    /// Atomically replaces the whole set, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when a writer panicked mid-swap.
    pub fn replace(&self, set: BundleSet) -> Result<Arc<BundleSet>, StoreError> {
        let next = Arc::new(set);
        let locales = next.locale_labels();
        let templates = next.template_count();
        let (previous, generation) = {
            let mut guard = self.current.write().map_err(|_| StoreError::Poisoned)?;
            guard.generation += 1;
            (std::mem::replace(&mut guard.set, next), guard.generation)
        };
        self.audit.record(
            &RegistryAuditEvent::new(EVENT_BUNDLE_SET_REPLACED)
                .with_generation(generation)
                .with_locales(locales)
                .with_templates(templates),
        );
        Ok(previous)
    }

    /// Copies the active set, inserts `bundle`, and swaps the copy in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when a writer panicked mid-swap.
    pub fn reload_locale(&self, bundle: LocaleBundle) -> Result<(), StoreError> {
        let locale = bundle.locale().to_string();
        let templates = bundle.template_count();
        let bundle = Arc::new(bundle);
        let (locales, generation) = {
            let mut guard = self.current.write().map_err(|_| StoreError::Poisoned)?;
            let mut next = BundleSet::clone(&guard.set);
            next.insert(bundle);
            let locales = next.locale_labels();
            guard.set = Arc::new(next);
            guard.generation += 1;
            (locales, guard.generation)
        };
        self.audit.record(
            &RegistryAuditEvent::new(EVENT_BUNDLE_RELOADED)
                .with_generation(generation)
                .with_locale(locale)
                .with_locales(locales)
                .with_templates(templates),
        );
        Ok(())
    }
}
