// crates/flow-text-core/tests/store.rs
// ============================================================================
// Module: Bundle Store Tests
// Description: Snapshot isolation, generations, and reload audit events.
// Purpose: Ensure swaps are atomic and readers never see partial sets.
// ============================================================================

//! Bundle store tests for flow-text-core.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::thread;

use flow_text_core::BundleSet;
use flow_text_core::BundleStore;
use flow_text_core::FileAuditSink;
use flow_text_core::LocaleBundle;
use flow_text_core::LocaleCode;
use flow_text_core::MemoryAuditSink;
use flow_text_core::Params;
use flow_text_core::RegistryAuditEvent;
use flow_text_core::RegistryAuditSink;
use flow_text_core::audit::EVENT_BUNDLE_RELOADED;
use flow_text_core::audit::EVENT_BUNDLE_SET_REPLACED;
use flow_text_core::embedded;

fn locale(tag: &str) -> LocaleCode {
    LocaleCode::parse(tag).expect("locale")
}

fn abort_bundle(tag: &str, message: &str) -> LocaleBundle {
    let source = serde_json::json!({"config": {"abort": {"already_configured": message}}});
    LocaleBundle::load(locale(tag), &source.to_string()).expect("bundle")
}

fn abort_text(set: &BundleSet, tag: &str) -> String {
    set.resolve(&locale(tag), "config", "abort", "already_configured", &Params::new())
        .expect("resolved")
        .description
        .expect("description")
}

#[test]
fn snapshot_survives_replace() {
    let store = BundleStore::new(BundleSet::new(Vec::new()).with_bundle(abort_bundle("en", "old")));
    let before = store.snapshot().expect("snapshot");
    let previous = store
        .replace(BundleSet::new(Vec::new()).with_bundle(abort_bundle("en", "new")))
        .expect("replace");
    assert!(Arc::ptr_eq(&before, &previous));
    assert_eq!(abort_text(&before, "en"), "old");
    assert_eq!(abort_text(&store.snapshot().expect("snapshot"), "en"), "new");
}

#[test]
fn generation_counts_swaps() {
    let store = BundleStore::new(BundleSet::default());
    assert_eq!(store.generation().expect("generation"), 0);
    store.replace(BundleSet::default()).expect("replace");
    store.reload_locale(abort_bundle("de", "schon da")).expect("reload");
    assert_eq!(store.generation().expect("generation"), 2);
}

#[test]
fn reload_locale_copies_the_active_set() {
    let initial = BundleSet::new(vec![locale("en")]).with_bundle(abort_bundle("en", "configured"));
    let store = BundleStore::new(initial);
    let before = store.snapshot().expect("snapshot");

    store.reload_locale(abort_bundle("de", "konfiguriert")).expect("reload");
    let after = store.snapshot().expect("snapshot");

    assert!(!before.contains(&locale("de")));
    assert!(after.contains(&locale("de")));
    assert_eq!(after.fallback(), &[locale("en")]);
    assert_eq!(abort_text(&after, "de"), "konfiguriert");
    assert_eq!(abort_text(&after, "fr"), "configured");
    assert!(Arc::ptr_eq(
        before.get(&locale("en")).expect("en"),
        after.get(&locale("en")).expect("en")
    ));
}

#[test]
fn swaps_emit_audit_events() {
    let sink = Arc::new(MemoryAuditSink::new());
    let store = BundleStore::with_audit_sink(BundleSet::default(), Arc::clone(&sink) as Arc<dyn RegistryAuditSink>);
    store
        .replace(BundleSet::default().with_bundle(embedded::default_bundle().expect("embedded")))
        .expect("replace");
    store.reload_locale(abort_bundle("de", "konfiguriert")).expect("reload");

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event, EVENT_BUNDLE_SET_REPLACED);
    assert_eq!(events[0].generation, Some(1));
    assert_eq!(events[0].locales, vec!["en".to_string()]);
    assert_eq!(events[0].templates, 54);
    assert_eq!(events[1].event, EVENT_BUNDLE_RELOADED);
    assert_eq!(events[1].generation, Some(2));
    assert_eq!(events[1].locale.as_deref(), Some("de"));
    assert_eq!(events[1].locales, vec!["de".to_string(), "en".to_string()]);
    assert_eq!(events[1].templates, 1);
}

#[test]
fn concurrent_readers_see_whole_sets() {
    let store = Arc::new(BundleStore::new(
        BundleSet::new(Vec::new()).with_bundle(abort_bundle("en", "v0")).with_bundle(abort_bundle("de", "v0")),
    ));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    let set = store.snapshot().expect("snapshot");
                    assert_eq!(abort_text(&set, "en"), abort_text(&set, "de"));
                }
            })
        })
        .collect();
    for version in 1..=50 {
        let value = format!("v{version}");
        store
            .replace(
                BundleSet::new(Vec::new())
                    .with_bundle(abort_bundle("en", &value))
                    .with_bundle(abort_bundle("de", &value)),
            )
            .expect("replace");
    }
    for reader in readers {
        reader.join().expect("reader thread");
    }
    assert_eq!(store.generation().expect("generation"), 50);
    assert_eq!(abort_text(&store.snapshot().expect("snapshot"), "en"), "v50");
}

#[test]
fn file_sink_appends_json_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("audit.jsonl");
    let sink = FileAuditSink::new(&path).expect("sink");
    sink.record(&RegistryAuditEvent::new("bundle_loaded").with_locale("en").with_templates(54));
    sink.record(&RegistryAuditEvent::new("bundle_load_failed").with_locale("de").with_error("boom"));

    let contents = std::fs::read_to_string(&path).expect("read audit log");
    let lines: Vec<serde_json::Value> =
        contents.lines().map(|line| serde_json::from_str(line).expect("json line")).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "bundle_loaded");
    assert_eq!(lines[0]["templates"], 54);
    assert_eq!(lines[1]["locale"], "de");
    assert_eq!(lines[1]["error"], "boom");
}
