//! Configuration for benchmark runs
//!
//! Loads model pipelines and execution settings from TOML files and provides
//! runtime access.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model pipelines to benchmark
    #[serde(default)]
    pub models: Vec<ModelSpec>,
    #[serde(default)]
    pub benchmark: BenchmarkSettings,
    /// Per-model concurrency overrides (model id -> parallel requests)
    #[serde(default)]
    pub concurrency: HashMap<String, usize>,
}

/// One model pipeline: an OCR step plus an optional extraction step, or a
/// single direct image-to-JSON extraction step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// OCR model id, or "ground-truth" to reuse the reference markdown
    pub ocr: String,
    /// JSON extraction model id; omit to benchmark OCR only
    #[serde(default)]
    pub extraction: Option<String>,
    /// Extract JSON straight from the image, skipping the OCR step
    #[serde(default)]
    pub direct_image_extraction: bool,
}

impl ModelSpec {
    /// Display label used in progress output and reports
    pub fn label(&self) -> String {
        if self.direct_image_extraction {
            format!(
                "{} (img2json)",
                self.extraction.as_deref().unwrap_or(&self.ocr)
            )
        } else {
            match &self.extraction {
                Some(extraction) => format!("{} -> {}", self.ocr, extraction),
                None => self.ocr.clone(),
            }
        }
    }
}

/// Benchmark execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    /// Per-operation timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Parallel documents per model when no override matches
    #[serde(default = "default_concurrency")]
    pub default_concurrency: usize,
    /// Uppercase string leaves on both sides before scoring
    #[serde(default)]
    pub ignore_case: bool,
}

fn default_data_dir() -> String {
    "data".to_string()
}
fn default_results_dir() -> String {
    "results".to_string()
}
fn default_timeout_secs() -> u64 {
    600
}
fn default_concurrency() -> usize {
    20
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            results_dir: default_results_dir(),
            timeout_secs: default_timeout_secs(),
            default_concurrency: default_concurrency(),
            ignore_case: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from default config locations or return defaults
    pub fn load_or_default() -> Self {
        let config_paths = ["benchmark.toml", "config/benchmark.toml"];

        for path in &config_paths {
            if let Ok(config) = Self::from_file(path) {
                tracing::info!("Loaded configuration from {}", path);
                return config;
            }
        }

        tracing::info!("Using default configuration");
        Self::default()
    }

    /// Save configuration to a TOML file
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Parallel request budget for a model id
    pub fn concurrency_for(&self, model: &str) -> usize {
        self.concurrency
            .get(model)
            .copied()
            .or_else(|| builtin_concurrency(model))
            .unwrap_or(self.benchmark.default_concurrency)
    }

    /// A sample configuration worth committing as a starting point
    pub fn sample() -> Self {
        Self {
            models: vec![
                ModelSpec {
                    ocr: "gpt-4o".to_string(),
                    extraction: Some("gpt-4o".to_string()),
                    direct_image_extraction: false,
                },
                ModelSpec {
                    ocr: "gemini-2.0-flash-001".to_string(),
                    extraction: Some("gemini-2.0-flash-001".to_string()),
                    direct_image_extraction: false,
                },
                ModelSpec {
                    ocr: "gpt-4o".to_string(),
                    extraction: Some("gpt-4o".to_string()),
                    direct_image_extraction: true,
                },
                ModelSpec {
                    ocr: "ground-truth".to_string(),
                    extraction: Some("gpt-4o".to_string()),
                    direct_image_extraction: false,
                },
            ],
            benchmark: BenchmarkSettings::default(),
            concurrency: HashMap::new(),
        }
    }
}

/// Vendor rate limits vary widely; these defaults keep each model safely
/// under its published ceiling.
pub(crate) fn builtin_concurrency(model: &str) -> Option<usize> {
    let limit = match model {
        "gpt-4o" | "gpt-4o-mini" | "gpt-4.1" => 50,
        "gemini-2.0-flash-001" | "gemini-2.0-flash" => 30,
        "gemini-2.5-pro" | "gemini-2.5-flash" => 20,
        "o1" | "o1-mini" | "o3-mini" | "o4-mini" => 10,
        _ => return None,
    };
    Some(limit)
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = Config::default();
        assert!(config.models.is_empty());
        assert_eq!(config.benchmark.timeout_secs, 600);
        assert_eq!(config.benchmark.data_dir, "data");
        assert!(!config.benchmark.ignore_case);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[[models]]
ocr = "gpt-4o"
extraction = "gpt-4o"

[[models]]
ocr = "ground-truth"
extraction = "gemini-2.0-flash-001"

[benchmark]
data_dir = "fixtures"
timeout_secs = 120

[concurrency]
"gpt-4o" = 5
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].ocr, "gpt-4o");
        assert_eq!(config.models[1].extraction.as_deref(), Some("gemini-2.0-flash-001"));
        assert_eq!(config.benchmark.data_dir, "fixtures");
        assert_eq!(config.benchmark.timeout_secs, 120);
        assert_eq!(config.concurrency_for("gpt-4o"), 5);
    }

    #[test]
    fn test_concurrency_fallbacks() {
        let config = Config::default();
        // builtin table
        assert_eq!(config.concurrency_for("gemini-2.0-flash-001"), 30);
        // unknown model uses the default budget
        assert_eq!(config.concurrency_for("some-new-model"), 20);
    }

    #[test]
    fn test_model_labels() {
        let pipeline = ModelSpec {
            ocr: "gpt-4o".to_string(),
            extraction: Some("o3-mini".to_string()),
            direct_image_extraction: false,
        };
        assert_eq!(pipeline.label(), "gpt-4o -> o3-mini");

        let direct = ModelSpec {
            ocr: "gpt-4o".to_string(),
            extraction: Some("gpt-4o".to_string()),
            direct_image_extraction: true,
        };
        assert_eq!(direct.label(), "gpt-4o (img2json)");

        let ocr_only = ModelSpec {
            ocr: "gemini-2.0-flash-001".to_string(),
            extraction: None,
            direct_image_extraction: false,
        };
        assert_eq!(ocr_only.label(), "gemini-2.0-flash-001");
    }

    #[test]
    fn test_sample_round_trips() {
        let sample = Config::sample();
        let text = toml::to_string_pretty(&sample).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.models.len(), sample.models.len());
    }
}
