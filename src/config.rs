//! Configuration for rotating file managers
//!
//! Values come from defaults, a JSON file, or `ROTATE_*` environment
//! variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RotateError, RotateResult};

/// Configuration for a `RotateFileManager`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RotateConfig {
    /// Directory holding the rotated files
    pub dir: PathBuf,
    /// File written to before the first rotation
    pub initial_file: String,
    /// Maximum number of files kept on disk
    pub max_files: usize,
    /// Prefix of files picked up by discovery
    pub prefix: String,
    /// Suffix of files picked up by discovery
    pub suffix: String,
    /// Rotate before a file would grow past this many bytes
    pub max_bytes: Option<u64>,
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            initial_file: "current.log".to_string(),
            max_files: 10,
            prefix: String::new(),
            suffix: ".log".to_string(),
            max_bytes: None,
        }
    }
}

impl RotateConfig {
    /// Create config with custom directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Get path to the initial file
    pub fn initial_path(&self) -> PathBuf {
        self.dir.join(&self.initial_file)
    }

    /// Load config from a JSON file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RotateResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            RotateError::InvalidConfig(format!("{}: {}", path.as_ref().display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `ROTATE_DIR`, `ROTATE_INITIAL_FILE`,
    /// `ROTATE_MAX_FILES`, `ROTATE_PREFIX`, `ROTATE_SUFFIX` and
    /// `ROTATE_MAX_BYTES`
    pub fn from_env() -> RotateResult<Self> {
        Self::default().merge_env(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name
    pub fn merge_env<F>(mut self, lookup: F) -> RotateResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("ROTATE_DIR") {
            self.dir = PathBuf::from(dir);
        }
        if let Some(initial_file) = lookup("ROTATE_INITIAL_FILE") {
            self.initial_file = initial_file;
        }
        if let Some(max_files) = lookup("ROTATE_MAX_FILES") {
            self.max_files = parse_number("ROTATE_MAX_FILES", &max_files)?;
        }
        if let Some(prefix) = lookup("ROTATE_PREFIX") {
            self.prefix = prefix;
        }
        if let Some(suffix) = lookup("ROTATE_SUFFIX") {
            self.suffix = suffix;
        }
        if let Some(max_bytes) = lookup("ROTATE_MAX_BYTES") {
            self.max_bytes = Some(parse_number("ROTATE_MAX_BYTES", &max_bytes)?);
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject settings the manager cannot work with
    pub fn validate(&self) -> RotateResult<()> {
        if self.max_files == 0 {
            return Err(RotateError::InvalidConfig(
                "maxFiles must be at least 1".to_string(),
            ));
        }
        if self.initial_file.is_empty() {
            return Err(RotateError::InvalidConfig(
                "initialFile must not be empty".to_string(),
            ));
        }
        if self.max_bytes == Some(0) {
            return Err(RotateError::InvalidConfig(
                "maxBytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> RotateResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RotateError::InvalidConfig(format!("{} is not a number: {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RotateConfig::default();
        assert_eq!(config.dir, PathBuf::from("logs"));
        assert_eq!(config.max_files, 10);
        assert_eq!(config.initial_path(), PathBuf::from("logs/current.log"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_bytes_must_be_positive() {
        let config = RotateConfig::new("out").with_max_bytes(4096);
        assert_eq!(config.max_bytes, Some(4096));
        assert!(config.validate().is_ok());

        let err = RotateConfig::new("out").with_max_bytes(0).validate().unwrap_err();
        assert!(err.to_string().contains("maxBytes"));
    }

    #[test]
    fn test_merge_env_overrides() {
        let config = RotateConfig::default()
            .merge_env(lookup_from(&[
                ("ROTATE_DIR", "/var/log/app"),
                ("ROTATE_MAX_FILES", " 4 "),
                ("ROTATE_PREFIX", "app-"),
                ("ROTATE_MAX_BYTES", "1048576"),
            ]))
            .unwrap();

        assert_eq!(config.dir, PathBuf::from("/var/log/app"));
        assert_eq!(config.max_files, 4);
        assert_eq!(config.prefix, "app-");
        assert_eq!(config.suffix, ".log");
        assert_eq!(config.max_bytes, Some(1_048_576));
    }

    #[test]
    fn test_merge_env_rejects_bad_numbers() {
        let err = RotateConfig::default()
            .merge_env(lookup_from(&[("ROTATE_MAX_FILES", "many")]))
            .unwrap_err();
        assert!(matches!(err, RotateError::InvalidConfig(_)));

        let err = RotateConfig::default()
            .merge_env(lookup_from(&[("ROTATE_MAX_FILES", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("maxFiles"));
    }

    #[test]
    fn test_from_json_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rotate.json");
        fs::write(&path, r#"{"dir": "out", "maxFiles": 3, "maxBytes": 512}"#).unwrap();

        let config = RotateConfig::from_json_file(&path).unwrap();
        assert_eq!(config.dir, PathBuf::from("out"));
        assert_eq!(config.max_files, 3);
        assert_eq!(config.max_bytes, Some(512));
        assert_eq!(config.initial_file, "current.log");
    }

    #[test]
    fn test_from_json_file_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rotate.json");
        fs::write(&path, "{not json").unwrap();

        let err = RotateConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, RotateError::InvalidConfig(_)));
    }
}
