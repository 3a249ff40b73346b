// crates/flow-text-config/src/lib.rs
// ============================================================================
// Module: Flow Text Config Library
// Description: Canonical config model, validation, and disk loading.
// Purpose: Single source of truth for flow-text.toml semantics.
// Dependencies: flow-text-core, serde, toml
// ============================================================================

//! ## Overview
//! `flow-text-config` defines the configuration model for the flow text
//! registry, validates it fail-closed, and loads the configured locale bundles
//! from disk into a [`flow_text_core::BundleStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod loader;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use loader::LoaderError;
pub use loader::build_audit_sink;
pub use loader::build_bundle_set;
pub use loader::load_store;
pub use loader::reload_store;
