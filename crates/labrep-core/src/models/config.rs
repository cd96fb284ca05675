//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LabrepError, Result};
use crate::report::{FieldKind, PatternRegistry};

/// Main configuration for labrep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabrepConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,

    /// Vertical distance (pixels) within which text boxes share a row.
    pub row_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unk: false,
            row_tolerance: 20.0,
        }
    }
}

/// Model file names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

/// Additional report layouts, appended after the built-in ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extra report date patterns.
    pub extra_date_patterns: Vec<PatternSpec>,

    /// Extra serum creatinine patterns.
    pub extra_creatinine_patterns: Vec<PatternSpec>,
}

/// A layout pattern declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Layout name, shown in match diagnostics.
    pub name: String,

    /// Regular expression; matched case-insensitively.
    pub pattern: String,

    /// Capture group holding the field value.
    #[serde(default = "default_group")]
    pub group: usize,
}

fn default_group() -> usize {
    1
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: String,

    /// Port to listen on.
    pub port: u16,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl LabrepConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| LabrepError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| LabrepError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Full path of a model file inside the configured model directory.
    pub fn model_path(&self, file_name: &str) -> PathBuf {
        self.models.model_dir.join(file_name)
    }

    /// Build the pattern registry: built-in layouts followed by configured ones.
    pub fn build_registry(&self) -> Result<PatternRegistry> {
        let mut builder = PatternRegistry::builder();

        for spec in &self.extraction.extra_date_patterns {
            builder = builder.with_pattern(FieldKind::Date, &spec.name, &spec.pattern, spec.group)?;
        }
        for spec in &self.extraction.extra_creatinine_patterns {
            builder =
                builder.with_pattern(FieldKind::Creatinine, &spec.name, &spec.pattern, spec.group)?;
        }

        Ok(builder.build())
    }
}
