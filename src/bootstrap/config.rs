//! # Configuration Loader
//!
//! Reads the host's TOML configuration and tour definition files into core
//! DTOs. Only loading happens here; defaults for absent keys live in
//! `tour_core::config::defaults`.

use std::path::Path;

use anyhow::Context;
use tour_core::tour::TourCatalog;
use tour_core::TourConfig;

/// Load configuration from a TOML file.
///
/// A missing file is not an error: the host runs on defaults. A file that
/// exists but cannot be read or parsed is reported with its path.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<TourConfig> {
    let Some(config_path) = config_path else {
        return Ok(TourConfig::default());
    };
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
        return Ok(TourConfig::default());
    }

    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    TourConfig::from_toml(&toml_value)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))
}

/// Load a tour definition file. `.json` files are parsed as JSON, anything
/// else as TOML.
pub fn load_catalog(path: &Path) -> anyhow::Result<TourCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tour file: {}", path.display()))?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let catalog = if is_json {
        TourCatalog::from_json(&content)
    } else {
        TourCatalog::from_toml(&content)
    };
    catalog.with_context(|| format!("Failed to load tours from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn test_load_config_reads_valid_toml() {
        let toml_content = r#"
            [persistence]
            debounce_ms = 500
            storage_key = "onboarding"

            [navigation]
            timeout_ms = 2000
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(Some(temp_file.path())).unwrap();

        assert_eq!(config.persistence.debounce, Duration::from_millis(500));
        assert_eq!(config.persistence.storage_key, "onboarding");
        assert_eq!(config.navigation.timeout, Duration::from_secs(2));
        assert_eq!(config.navigation.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, TourConfig::default());

        assert_eq!(load_config(None).unwrap(), TourConfig::default());
    }

    #[test]
    fn test_load_config_rejects_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[persistence\n").unwrap();

        let err = load_config(Some(temp_file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config as TOML"));
    }

    #[test]
    fn test_load_catalog_picks_format_by_extension() {
        let mut json = Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br##"{"tours":[{"id":"welcome","steps":[{"target":"#a"}]}]}"##)
            .unwrap();
        let mut toml = Builder::new().suffix(".toml").tempfile().unwrap();
        toml.write_all(b"[[tours]]\nid = \"welcome\"\n[[tours.steps]]\ntarget = \"#a\"\n")
            .unwrap();

        for file in [json.path(), toml.path()] {
            let registry = load_catalog(file).unwrap().into_registry();
            assert_eq!(registry.len(), 1);
            assert_eq!(registry.get(&"welcome".into()).unwrap()[0].target, "#a");
        }
    }
}
