//! Analysis settings.
//!
//! Settings come from three places, later ones winning: built-in defaults, an optional JSON
//! file, and command line flags (which also read `MOLECULA_*` environment variables).

use crate::analysis::flags::FlagRules;
use crate::simulation::simulated_detector::DegenerateSamplePolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Confidence threshold must be within [0, 1], got {0}.")]
    ConfidenceOutOfRange(f64),
    #[error("Malaria probability must be within [0, 1], got {0}.")]
    ProbabilityOutOfRange(f64),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Detections below this confidence are dropped before evaluation.
    pub confidence_threshold: f64,
    pub degenerate_policy: DegenerateSamplePolicy,
    pub flag_rules: FlagRules,
    pub output_dir: PathBuf,
    /// Write one PNG per white cell next to the annotated image.
    pub save_crops: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            confidence_threshold: 0.5,
            degenerate_policy: DegenerateSamplePolicy::default(),
            flag_rules: FlagRules::default(),
            output_dir: PathBuf::from("output"),
            save_crops: true,
        }
    }
}

impl AnalysisConfig {
    /// Reads a config from a json file. Missing keys keep their defaults.
    pub fn from_json_file(filepath: &Path) -> Result<Self, ConfigError> {
        let file = File::open(filepath).map_err(|source| ConfigError::Read {
            path: filepath.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: filepath.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::ConfidenceOutOfRange(self.confidence_threshold));
        }
        let probability = self.flag_rules.malaria_probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::ProbabilityOutOfRange(probability));
        }
        Ok(())
    }
}
