// crates/flow-text-core/src/lib.rs
// ============================================================================
// Module: Flow Text Core Library
// Description: Public API surface for the flow text registry.
// Purpose: Expose bundle loading, text resolution, and the bundle store.
// Dependencies: crate::{audit, bundle, embedded, error, identifiers, parity, registry, store,
// template}
// ============================================================================

//! ## Overview
//! `flow-text-core` loads localized setup-wizard strings (section → group →
//! step → field), validates them fail-closed, and resolves them into display
//! text by substituting `{placeholder}` tokens with runtime parameters.
//!
//! Bundles are immutable once loaded. Hosts share them through a
//! [`BundleStore`], which swaps whole bundle sets atomically on reload.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod bundle;
pub mod embedded;
pub mod error;
pub mod identifiers;
pub mod parity;
mod raw;
pub mod registry;
pub mod store;
pub mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RegistryAuditEvent;
pub use audit::RegistryAuditSink;
pub use audit::StderrAuditSink;
pub use bundle::LoadLimits;
pub use bundle::LocaleBundle;
pub use bundle::Section;
pub use bundle::StepGroup;
pub use bundle::StepText;
pub use error::RegistryError;
pub use error::StoreError;
pub use identifiers::LocaleCode;
pub use identifiers::LocaleError;
pub use parity::ParityReport;
pub use parity::PlaceholderMismatch;
pub use registry::ResolvedField;
pub use registry::ResolvedText;
pub use registry::list_fields;
pub use registry::list_fields_first;
pub use registry::resolve;
pub use registry::resolve_first;
pub use registry::resolve_text;
pub use registry::resolve_text_first;
pub use store::BundleSet;
pub use store::BundleStore;
pub use template::Params;
pub use template::Segment;
pub use template::Template;
pub use template::TemplateError;
