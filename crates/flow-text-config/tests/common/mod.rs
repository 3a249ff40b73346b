// crates/flow-text-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config and loader tests.
// Purpose: Reduce duplication across integration tests for flow-text-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use flow_text_config::ConfigError;
use flow_text_config::FlowTextConfig;

/// English bundle used by loader tests.
pub const EN_BUNDLE: &str = r#"{
  "config": {
    "step": {
      "link": {
        "title": "Link Nest Account",
        "description": "Open [the console]({url}).",
        "data": {"code": "PIN code"}
      }
    },
    "abort": {"already_configured": "Account is already configured"}
  }
}"#;

/// German bundle used by loader tests.
pub const DE_BUNDLE: &str = r#"{
  "config": {
    "abort": {"already_configured": "Konto ist bereits konfiguriert"}
  }
}"#;

/// Parses a TOML string into a `FlowTextConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<FlowTextConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a config with a single English bundle and defaults elsewhere.
pub fn minimal_config() -> Result<FlowTextConfig, toml::de::Error> {
    config_from_toml(
        r#"
[[bundles]]
locale = "en"
path = "en.json"
"#,
    )
}

/// Writes `contents` to `dir/name`, returning the full path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, String> {
    let path = dir.join(name);
    fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok(path)
}

/// Writes a config file plus bundles into `dir` and loads it.
pub fn load_config_in(
    dir: &Path,
    config: &str,
    bundles: &[(&str, &str)],
) -> Result<FlowTextConfig, String> {
    for (name, contents) in bundles {
        write_file(dir, name, contents)?;
    }
    let path = write_file(dir, "flow-text.toml", config)?;
    FlowTextConfig::load(Some(&path)).map_err(|err| err.to_string())
}

/// Asserts that a validation result is an error containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
