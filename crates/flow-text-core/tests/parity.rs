// crates/flow-text-core/tests/parity.rs
// ============================================================================
// Module: Translation Parity Tests
// Description: Coverage and placeholder agreement between locale bundles.
// Purpose: Catch translations that drop steps or rename placeholders.
// ============================================================================

//! Parity report tests for flow-text-core.

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
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;

use flow_text_core::LocaleBundle;
use flow_text_core::LocaleCode;
use flow_text_core::ParityReport;
use flow_text_core::embedded;

fn bundle(tag: &str, source: &str) -> LocaleBundle {
    LocaleBundle::load(LocaleCode::parse(tag).expect("locale"), source).expect("bundle")
}

#[test]
fn partial_translation_reports_missing_paths() {
    let en = embedded::default_bundle().expect("embedded bundle");
    let de = bundle("de", include_str!("fixtures/de.json"));
    let report = ParityReport::compare(&en, &de);

    assert_eq!(report.base, "en");
    assert_eq!(report.candidate, "de");
    assert_eq!(report.missing.len(), 48);
    assert!(report.missing.contains(&"config.error.timeout.description".to_string()));
    assert!(!report.missing.contains(&"config.step.link.data.code".to_string()));
    assert!(report.extra.is_empty());
    assert!(report.mismatched.is_empty());
    assert!((report.coverage - 6.0 / 54.0).abs() < 1e-9);
    assert!(!report.is_clean());
}

#[test]
fn renamed_placeholder_is_a_mismatch() {
    let base = bundle("en", r#"{"config": {"step": {"link": {"description": "Open {url}"}}}}"#);
    let candidate = bundle("fr", r#"{"config": {"step": {"link": {"description": "Ouvrir {lien}"}}}}"#);
    let report = ParityReport::compare(&base, &candidate);

    assert!(report.missing.is_empty());
    assert_eq!(report.mismatched.len(), 1);
    let mismatch = &report.mismatched[0];
    assert_eq!(mismatch.path, "config.step.link.description");
    assert_eq!(mismatch.expected, BTreeSet::from(["url".to_string()]));
    assert_eq!(mismatch.actual, BTreeSet::from(["lien".to_string()]));
    assert_eq!(report.coverage, 1.0);
    assert!(!report.is_clean());
}

#[test]
fn complete_translation_is_clean() {
    let base = bundle(
        "en",
        r#"{"config": {"step": {"user": {"title": "Hi {name}", "data": {"host": "Host"}}}}}"#,
    );
    let candidate = bundle(
        "de",
        r#"{"config": {"step": {"user": {"title": "Hallo {name}", "data": {"host": "Rechner"}}},
             "error": {"extra": "Nur hier"}}}"#,
    );
    let report = ParityReport::compare(&base, &candidate);
    assert!(report.is_clean());
    assert_eq!(report.extra, vec!["config.error.extra.description".to_string()]);
    assert_eq!(report.coverage, 1.0);

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["candidate"], "de");
}

#[test]
fn empty_base_has_full_coverage() {
    let base = bundle("en", "{}");
    let candidate = bundle("de", include_str!("fixtures/de.json"));
    let report = ParityReport::compare(&base, &candidate);
    assert_eq!(report.coverage, 1.0);
    assert_eq!(report.extra.len(), 6);
}
