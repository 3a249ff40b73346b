// crates/flow-text-core/tests/bundle_load.rs
// ============================================================================
// Module: Bundle Load Tests
// Description: Schema validation for locale bundle documents.
// Purpose: Ensure malformed bundles fail closed with a located error.
// ============================================================================

//! Bundle loading tests for flow-text-core.

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

use flow_text_core::LoadLimits;
use flow_text_core::LocaleBundle;
use flow_text_core::LocaleCode;
use flow_text_core::RegistryError;
use flow_text_core::embedded;

fn en() -> LocaleCode {
    LocaleCode::parse("en").expect("locale")
}

fn assert_malformed(source: &str, needle: &str) {
    match LocaleBundle::load(en(), source) {
        Err(RegistryError::MalformedBundle(message)) => {
            assert!(message.contains(needle), "error `{message}` did not contain `{needle}`");
        }
        Err(other) => panic!("expected MalformedBundle, got {other:?}"),
        Ok(_) => panic!("expected load failure for {source}"),
    }
}

#[test]
fn embedded_bundle_loads() {
    let bundle = embedded::default_bundle().expect("embedded bundle");
    assert_eq!(bundle.locale().as_str(), "en");
    assert_eq!(bundle.template_count(), 54);
    let sections: Vec<&str> = bundle.sections().map(|(name, _)| name).collect();
    assert_eq!(sections, vec!["application_credentials", "config", "device_automation"]);
}

#[test]
fn embedded_bundle_keeps_group_order() {
    let bundle = embedded::default_bundle().expect("embedded bundle");
    let config = bundle.section("config").expect("config section");
    let groups: Vec<&str> = config.groups().map(|(kind, _)| kind).collect();
    assert_eq!(groups, vec!["step", "error", "abort", "create_entry"]);
    let triggers = bundle
        .section("device_automation")
        .and_then(|section| section.group("trigger_type"))
        .expect("trigger group");
    let ids: Vec<&str> = triggers.steps().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["camera_person", "camera_motion", "camera_sound", "doorbell_chime"]);
}

#[test]
fn bare_messages_become_descriptions() {
    let bundle = embedded::default_bundle().expect("embedded bundle");
    let step = bundle
        .section("config")
        .and_then(|section| section.group("abort"))
        .and_then(|group| group.step("already_configured"))
        .expect("abort reason");
    assert!(step.title().is_none());
    assert_eq!(step.description().map(|t| t.source()), Some("Account is already configured"));
    assert_eq!(step.fields().count(), 0);
}

#[test]
fn flat_section_text_is_loaded() {
    let bundle = embedded::default_bundle().expect("embedded bundle");
    let section = bundle.section("application_credentials").expect("section");
    let template = section.text("description").expect("description");
    assert_eq!(
        template.placeholders(),
        vec!["more_info_url", "oauth_consent_url", "oauth_creds_url", "redirect_url"]
    );
    assert!(section.groups().next().is_none());
}

#[test]
fn templates_lists_dotted_paths() {
    let bundle = LocaleBundle::load(
        en(),
        r#"{"config": {"step": {"user": {"title": "T", "data": {"a": "A"}, "data_description": {"a": "help"}}}}}"#,
    )
    .expect("bundle");
    let paths: Vec<String> = bundle.templates().into_iter().map(|(path, _)| path).collect();
    assert_eq!(
        paths,
        vec![
            "config.step.user.title",
            "config.step.user.data.a",
            "config.step.user.data_description.a",
        ]
    );
}

#[test]
fn rejects_invalid_json() {
    assert_malformed("{", "EOF");
}

#[test]
fn rejects_non_object_root() {
    assert_malformed(r#""just text""#, "bundle root must be an object");
}

#[test]
fn rejects_string_section() {
    assert_malformed(r#"{"title": "Nest"}"#, "title: section must be an object");
}

#[test]
fn rejects_non_string_leaf() {
    assert_malformed(r#"{"config": {"abort": {"timeout": 5}}}"#, "invalid type: integer");
    assert_malformed(r#"{"config": {"abort": {"timeout": null}}}"#, "invalid type: null");
    assert_malformed(r#"{"config": {"abort": {"timeout": ["a"]}}}"#, "invalid type: sequence");
}

#[test]
fn rejects_nesting_too_deep() {
    assert_malformed(
        r#"{"config": {"step": {"user": {"title": {"nested": "x"}}}}}"#,
        "config.step.user.title: expected a string, found object",
    );
    assert_malformed(
        r#"{"config": {"step": {"user": {"data": {"host": {"deep": "x"}}}}}}"#,
        "config.step.user.data.host: expected a string, found object",
    );
}

#[test]
fn rejects_data_that_is_not_an_object() {
    assert_malformed(
        r#"{"config": {"step": {"user": {"data": "Host"}}}}"#,
        "config.step.user.data: expected an object of field labels",
    );
}

#[test]
fn rejects_unknown_step_key() {
    assert_malformed(
        r#"{"config": {"step": {"user": {"subtitle": "x"}}}}"#,
        "config.step.user.subtitle: unknown step key",
    );
}

#[test]
fn rejects_duplicate_keys() {
    assert_malformed(r#"{"config": {"error": {"a": "1", "a": "2"}}}"#, "duplicate key `a`");
}

#[test]
fn rejects_unbalanced_braces() {
    assert_malformed(
        r#"{"config": {"step": {"link": {"description": "Go to {url"}}}}"#,
        "config.step.link.description: unmatched '{' at byte 6",
    );
    assert_malformed(
        r#"{"config": {"error": {"bad": "oops}"}}}"#,
        "config.error.bad: unmatched '}' at byte 4",
    );
    assert_malformed(
        r#"{"config": {"error": {"bad": "{not valid}"}}}"#,
        "invalid placeholder 'not valid'",
    );
}

#[test]
fn rejects_description_for_undeclared_field() {
    assert_malformed(
        r#"{"config": {"step": {"user": {"data": {"a": "A"}, "data_description": {"b": "B"}}}}}"#,
        "config.step.user.data_description.b: describes a field not declared in data",
    );
}

#[test]
fn rejects_invalid_keys() {
    assert_malformed(r#"{"config": {"error": {"": "x"}}}"#, "key must be non-empty");
    assert_malformed(r#"{"config": {"error": {"a.b": "x"}}}"#, "config.error.a.b: key must not");
    assert_malformed(r#"{"config": {"error": {"a b": "x"}}}"#, "key must not");
}

#[test]
fn enforces_bundle_size_limit() {
    let limits = LoadLimits {
        max_bundle_bytes: 16,
        ..LoadLimits::default()
    };
    let result = LocaleBundle::load_with_limits(en(), r#"{"config": {"error": {}}}"#, &limits);
    assert!(matches!(result, Err(RegistryError::MalformedBundle(message)) if message.contains("size limit")));
}

#[test]
fn enforces_template_limits() {
    let limits = LoadLimits {
        max_template_bytes: 4,
        ..LoadLimits::default()
    };
    let result = LocaleBundle::load_with_limits(en(), r#"{"c": {"error": {"a": "12345"}}}"#, &limits);
    assert!(matches!(result, Err(RegistryError::MalformedBundle(message)) if message.contains("c.error.a")));

    let limits = LoadLimits {
        max_entries: 2,
        ..LoadLimits::default()
    };
    let result =
        LocaleBundle::load_with_limits(en(), r#"{"c": {"error": {"a": "1", "b": "2", "c": "3"}}}"#, &limits);
    assert!(matches!(result, Err(RegistryError::MalformedBundle(message)) if message.contains("exceeds 2 templates")));
}

#[test]
fn enforces_key_limit() {
    let limits = LoadLimits {
        max_key_bytes: 3,
        ..LoadLimits::default()
    };
    let result = LocaleBundle::load_with_limits(en(), r#"{"config": {}}"#, &limits);
    assert!(matches!(result, Err(RegistryError::MalformedBundle(message)) if message.contains("key exceeds max length")));
}

#[test]
fn empty_sections_and_groups_are_allowed() {
    let bundle = LocaleBundle::load(en(), r#"{"config": {"abort": {}}, "options": {}}"#).expect("bundle");
    assert_eq!(bundle.template_count(), 0);
    assert!(bundle.section("config").and_then(|s| s.group("abort")).is_some_and(|g| g.is_empty()));
}
