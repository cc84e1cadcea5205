use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::icon::resample::ColorFilter;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub color_filter: ColorFilter,
    #[serde(default = "default_log_level")]
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String, // appended to the input stem when no output is given
}

fn default_log_level() -> String { "warn".to_string() }
fn default_log_to_file() -> bool { true }
fn default_output_suffix() -> String { "_dC".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            color_filter: ColorFilter::default(),
            log_level: default_log_level(),
            log_to_file: default_log_to_file(),
            output_suffix: default_output_suffix(),
        }
    }
}

impl Config {
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Warn,
        }
    }
}

pub fn get_config_dir() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_default()
        .join("icon-transplant");
    let _ = std::fs::create_dir_all(&config_dir);
    config_dir
}

pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

pub fn load_config() -> Config {
    load_config_from(&get_config_path())
}

/// Reads `path`, falling back to defaults if it is unreadable. A missing file
/// is created with the defaults so it can be edited later.
pub fn load_config_from(path: &Path) -> Config {
    if path.exists() {
        let data = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&data).unwrap_or_default()
    } else {
        let config = Config::default();
        save_config_to(&config, path);
        config
    }
}

pub fn save_config_to(config: &Config, path: &Path) {
    if let Ok(data) = serde_json::to_string_pretty(config) {
        let _ = std::fs::write(path, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_written_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = load_config_from(&path);
        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(load_config_from(&path), config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "color_filter": "lanczos3", "log_level": "debug" }"#).unwrap();
        let config = load_config_from(&path);
        assert_eq!(config.color_filter, ColorFilter::Lanczos3);
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
        assert!(config.log_to_file);
        assert_eq!(config.output_suffix, "_dC");
    }

    #[test]
    fn test_garbage_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(load_config_from(&path), Config::default());
    }
}
