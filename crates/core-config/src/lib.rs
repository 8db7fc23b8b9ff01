//! Configuration loading: a JSON blob of user preferences, discovered on an
//! XDG-style path or overridden explicitly, parsed leniently with a
//! documented default for every field.
//!
//! Unknown keys are preserved byte-for-byte across a load/save round trip
//! (forward compatibility with a newer binary's config additions); invalid
//! JSON degrades to defaults rather than refusing to start, matching the
//! "persistence is a convenience" stance the history store also takes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

fn default_platform() -> String {
    if cfg!(windows) {
        "windows".to_string()
    } else if cfg!(target_os = "macos") {
        "macos".to_string()
    } else {
        "linux".to_string()
    }
}

const fn default_true() -> bool {
    true
}

const fn default_false() -> bool {
    false
}

fn default_theme() -> String {
    "mystic_purple".to_string()
}

const fn default_compress_threshold() -> usize {
    10
}

const fn default_history_max_entries() -> usize {
    1000
}

/// The recognised configuration keys (§6). Any field absent from the file
/// falls back to its documented default; fields present but of the wrong
/// JSON type also fall back (the whole file is then treated as unparsable,
/// see [`Config::load`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_true")]
    pub unicode_box: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub auto_multiline: bool,
    #[serde(default = "default_compress_threshold")]
    pub compress_threshold: usize,
    #[serde(default = "default_history_max_entries")]
    pub history_max_entries: usize,
    #[serde(default = "default_false")]
    pub use_fallback_input: bool,

    /// Any keys this binary doesn't recognise are kept here so a write-back
    /// preserves them instead of silently dropping a newer binary's fields.
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            ansi_colors: default_true(),
            unicode_box: default_true(),
            theme: default_theme(),
            auto_multiline: default_true(),
            compress_threshold: default_compress_threshold(),
            history_max_entries: default_history_max_entries(),
            use_fallback_input: default_false(),
            unknown: Map::new(),
        }
    }
}

/// Best-effort config file path following platform conventions: an
/// application subdirectory under the OS config dir (XDG on Linux, Roaming
/// AppData on Windows, Application Support on macOS), falling back to a
/// bare relative filename if no config dir can be resolved.
pub fn discover() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("agent-input").join("config.json"),
        None => PathBuf::from("agent-input-config.json"),
    }
}

impl Config {
    /// Load from `path` (or the discovered default path). A missing file,
    /// unreadable file, or invalid JSON all degrade to [`Config::default`];
    /// the degrade is logged at `info`, never surfaced as an error.
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(Path::to_path_buf).unwrap_or_else(discover);
        let Ok(content) = std::fs::read_to_string(&resolved) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(err) => {
                info!(
                    target: "config",
                    path = %resolved.display(),
                    error = %err,
                    "config_parse_failed_using_defaults"
                );
                Self::default()
            }
        }
    }

    /// Full-file overwrite at `path` (or the discovered default path).
    /// Failures are logged at `info` and otherwise swallowed: persistence is
    /// best-effort, never a reason to fail the interactive session.
    pub fn save(&self, path: Option<&Path>) {
        let resolved = path.map(Path::to_path_buf).unwrap_or_else(discover);
        if let Some(parent) = resolved.parent()
            && !parent.as_os_str().is_empty()
            && let Err(err) = std::fs::create_dir_all(parent)
        {
            info!(target: "config", error = %err, "config_dir_create_failed");
            return;
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&resolved, json) {
                    info!(target: "config", path = %resolved.display(), error = %err, "config_save_failed");
                }
            }
            Err(err) => info!(target: "config", error = %err, "config_serialize_failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::default();
        assert!(cfg.ansi_colors);
        assert!(cfg.unicode_box);
        assert_eq!(cfg.theme, "mystic_purple");
        assert!(cfg.auto_multiline);
        assert_eq!(cfg.compress_threshold, 10);
        assert_eq!(cfg.history_max_entries, 1000);
        assert!(!cfg.use_fallback_input);
    }

    #[test]
    fn missing_file_degrades_to_defaults() {
        let cfg = Config::load(Some(Path::new("__definitely_missing__.json")));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn invalid_json_degrades_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "{ not json").unwrap();
        let cfg = Config::load(Some(tmp.path()));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn parses_recognised_keys() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"{"ansi_colors": false, "compress_threshold": 25, "theme": "plain"}"#,
        )
        .unwrap();
        let cfg = Config::load(Some(tmp.path()));
        assert!(!cfg.ansi_colors);
        assert_eq!(cfg.compress_threshold, 25);
        assert_eq!(cfg.theme, "plain");
        // untouched keys keep their defaults
        assert!(cfg.unicode_box);
        assert_eq!(cfg.history_max_entries, 1000);
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{"future_field": 42}"#).unwrap();
        let cfg = Config::load(Some(tmp.path()));
        assert_eq!(cfg.unknown.get("future_field"), Some(&Value::from(42)));
        cfg.save(Some(tmp.path()));
        let reloaded = Config::load(Some(tmp.path()));
        assert_eq!(reloaded.unknown.get("future_field"), Some(&Value::from(42)));
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut cfg = Config::default();
        cfg.compress_threshold = 42;
        cfg.save(Some(tmp.path()));
        let reloaded = Config::load(Some(tmp.path()));
        assert_eq!(reloaded.compress_threshold, 42);
    }
}
