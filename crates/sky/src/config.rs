//! Loading of YAML/JSON configuration files.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialization format of a configuration file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());
        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => anyhow::bail!(
                "Config file must have a .yaml, .yml or .json extension: {}",
                path.display()
            ),
        }
    }
}

/// Deserialize a YAML or JSON file into `T`.
pub fn load_config_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
        ConfigFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
    };
    Ok(config)
}

/// Render a config as YAML for the run log.
pub fn format_values<T: Serialize>(config: &T) -> Result<String> {
    serde_yaml::to_string(config).context("Failed to render config values")
}

/// Copy a config file into the result folder, keeping its file name.
pub fn copy_to_result_folder(config_path: &Path, result_folder: &Path) -> Result<PathBuf> {
    let file_name = config_path
        .file_name()
        .with_context(|| format!("Config path has no file name: {}", config_path.display()))?;
    let target = result_folder.join(file_name);
    fs::copy(config_path, &target).with_context(|| {
        format!(
            "Failed to copy config {} to {}",
            config_path.display(),
            target.display()
        )
    })?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        amp: f64,
        nx: usize,
    }

    #[test]
    fn yaml_and_json_are_detected_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("para.yaml");
        let json = dir.path().join("para.json");
        fs::write(&yaml, "amp: 2.0\nnx: 5\n").unwrap();
        fs::write(&json, r#"{"amp": 2.0, "nx": 5}"#).unwrap();

        let a: Sample = load_config_file(&yaml).unwrap();
        let b: Sample = load_config_file(&json).unwrap();
        assert_eq!(a, Sample { amp: 2.0, nx: 5 });
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("para.txt");
        fs::write(&path, "amp: 1").unwrap();
        assert!(load_config_file::<Sample>(&path).is_err());
    }

    #[test]
    fn values_render_as_yaml() {
        #[derive(serde::Serialize)]
        struct Values {
            amp: f64,
            tag: &'static str,
        }
        let text = format_values(&Values { amp: 1.5, tag: "run" }).unwrap();
        assert_eq!(text, "amp: 1.5\ntag: run\n");
    }

    #[test]
    fn unrenderable_values_are_an_error() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("not renderable"))
            }
        }
        assert!(format_values(&Broken).is_err());
    }

    #[test]
    fn copies_config_next_to_results() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("sim_para.yaml");
        let results = dir.path().join("results");
        fs::create_dir(&results).unwrap();
        fs::write(&config, "amp: 1.0\n").unwrap();

        let copied = copy_to_result_folder(&config, &results).unwrap();
        assert_eq!(copied, results.join("sim_para.yaml"));
        assert!(copied.exists());
    }
}
