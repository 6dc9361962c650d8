// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Analysis settings.
//!
//! Settings load from YAML or TOML files; the format is chosen by file
//! extension. Every field has a default, so a file only lists what it
//! changes.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::detect::{Algorithm, Precision};
use crate::error::TheoryError;
use crate::music::KeyId;

/// Settings for [`analyze_melody`](crate::harmony::analyze_melody)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Key detection algorithm
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Trailing notes considered per note by the scoring detector
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Viterbi arithmetic
    #[serde(default)]
    pub precision: Precision,
    /// Key used when nothing can be detected
    #[serde(default)]
    pub default_key: KeyId,
    /// Chord options reported per note
    #[serde(default = "default_chord_options")]
    pub chord_options: usize,
}

fn default_window_size() -> usize {
    6
}
fn default_chord_options() -> usize {
    2
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            window_size: default_window_size(),
            precision: Precision::default(),
            default_key: KeyId::default(),
            chord_options: default_chord_options(),
        }
    }
}

impl AnalysisConfig {
    /// Load settings from a `.yaml`, `.yml` or `.toml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            _ => Self::from_yaml(&contents),
        }
        .with_context(|| format!("Invalid config file: {:?}", path))?;

        config.validate()?;
        tracing::debug!(?path, algorithm = %config.algorithm, "loaded config");
        Ok(config)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse settings from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save settings to a file, as TOML for `.toml` paths and YAML otherwise
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => {
                toml::to_string(self).context("Failed to serialize configuration to TOML")?
            }
            _ => self.to_yaml()?,
        };
        fs::write(path, text).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(TheoryError::InvalidWindow(self.window_size).into());
        }
        if self.chord_options == 0 {
            bail!("chord_options must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.algorithm, Algorithm::Hmm);
        assert_eq!(config.window_size, 6);
        assert_eq!(config.precision, Precision::Linear);
        assert_eq!(config.default_key, KeyId::CMajor);
        assert_eq!(config.chord_options, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
algorithm: scoring
window_size: 4
default_key: "Sol Majeur"
"#;
        let config = AnalysisConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.algorithm, Algorithm::Scoring);
        assert_eq!(config.window_size, 4);
        assert_eq!(config.default_key, KeyId::GMajor);
        assert_eq!(config.precision, Precision::Linear);
        assert_eq!(config.chord_options, 2);
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
precision = "log"
default_key = "La Mineur"
chord_options = 3
"#;
        let config = AnalysisConfig::from_toml(text).unwrap();
        assert_eq!(config.algorithm, Algorithm::Hmm);
        assert_eq!(config.precision, Precision::Log);
        assert_eq!(config.default_key, KeyId::AMinor);
        assert_eq!(config.chord_options, 3);
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!(AnalysisConfig::from_yaml("algorithm: krumhansl").is_err());
        assert!(AnalysisConfig::from_yaml("default_key: Do Lydien").is_err());
        assert!(AnalysisConfig::from_toml("precision = \"float\"").is_err());
    }

    #[test]
    fn test_validate() {
        let config = AnalysisConfig {
            window_size: 0,
            ..AnalysisConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.downcast_ref::<TheoryError>(),
            Some(&TheoryError::InvalidWindow(0))
        );

        let config = AnalysisConfig {
            chord_options: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config = AnalysisConfig {
            algorithm: Algorithm::Scoring,
            window_size: 8,
            precision: Precision::Log,
            default_key: KeyId::DMinor,
            chord_options: 3,
        };

        for name in ["analysis.yaml", "analysis.toml"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(AnalysisConfig::load(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        assert!(AnalysisConfig::load(dir.path().join("missing.yaml")).is_err());

        let path = dir.path().join("invalid.yaml");
        fs::write(&path, "this is not valid yaml: [").unwrap();
        assert!(AnalysisConfig::load(&path).is_err());

        let path = dir.path().join("zero.yaml");
        fs::write(&path, "window_size: 0").unwrap();
        assert!(AnalysisConfig::load(&path).is_err());
    }
}
