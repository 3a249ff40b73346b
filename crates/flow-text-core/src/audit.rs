// crates/flow-text-core/src/audit.rs
// ============================================================================
// Module: Bundle Audit Logging
// Description: Structured audit events for bundle loading and swaps.
// Purpose: Emit JSON-line audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Resolution itself never logs. Process-level bundle lifecycle events
//! (load, load failure, embedded fallback, swap, reload) are reported to a
//! [`RegistryAuditSink`] so deployments can route them to their preferred
//! logging pipeline. Events never carry template text or parameter values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Event Names
// ============================================================================

/// A bundle document was loaded and validated.
pub const EVENT_BUNDLE_LOADED: &str = "bundle_loaded";
/// A bundle document failed to load.
pub const EVENT_BUNDLE_LOAD_FAILED: &str = "bundle_load_failed";
/// The embedded default bundle was used in place of a configured one.
pub const EVENT_BUNDLE_EMBEDDED: &str = "bundle_embedded";
/// The whole bundle set was replaced.
pub const EVENT_BUNDLE_SET_REPLACED: &str = "bundle_set_replaced";
/// A single locale was reloaded into the bundle set.
pub const EVENT_BUNDLE_RELOADED: &str = "bundle_reloaded";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Bundle lifecycle audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Store generation after the event, when a swap occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
    /// Locale the event concerns, when it concerns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Locales present in the bundle set after a swap.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locales: Vec<String>,
    /// Number of templates in the loaded bundle(s).
    pub templates: usize,
    /// Error message for failure events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RegistryAuditEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            timestamp_ms: now_ms(),
            generation: None,
            locale: None,
            locales: Vec::new(),
            templates: 0,
            error: None,
        }
    }

    /// Sets the locale the event concerns.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Sets the locales present after a swap.
    #[must_use]
    pub fn with_locales(mut self, locales: Vec<String>) -> Self {
        self.locales = locales;
        self
    }

    /// Sets the store generation.
    #[must_use]
    pub const fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Sets the template count.
    #[must_use]
    pub const fn with_templates(mut self, templates: usize) -> Self {
        self.templates = templates;
        self
    }

    /// Sets the failure message.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Returns the current time in milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |duration| duration.as_millis())
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for bundle lifecycle events.
pub trait RegistryAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &RegistryAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl RegistryAuditSink for StderrAuditSink {
    fn record(&self, event: &RegistryAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RegistryAuditSink for FileAuditSink {
    fn record(&self, event: &RegistryAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl RegistryAuditSink for NoopAuditSink {
    fn record(&self, _event: &RegistryAuditEvent) {}
}

/// Audit sink that keeps events in memory (tests and embedding hosts).
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<RegistryAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RegistryAuditEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl RegistryAuditSink for MemoryAuditSink {
    fn record(&self, event: &RegistryAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}
