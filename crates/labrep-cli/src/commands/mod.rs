//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod serve;

use std::path::{Path, PathBuf};

use tracing::debug;

use labrep_core::models::config::LabrepConfig;
use labrep_core::{PureOcrEngine, ReportParser, create_engine_from_dir};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("labrep")
        .join("config.json")
}

/// Load `--config` if given, else the default file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<LabrepConfig> {
    if let Some(path) = config_path {
        return Ok(LabrepConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(LabrepConfig::from_file(&default_path)?)
    } else {
        Ok(LabrepConfig::default())
    }
}

/// Build the report parser once, with any extra layouts from configuration.
pub fn build_parser(config: &LabrepConfig) -> anyhow::Result<ReportParser> {
    let registry = config.build_registry()?;
    Ok(ReportParser::with_registry(registry))
}

/// Load the OCR engine from `model_dir`, falling back to the configured directory.
pub fn load_engine(
    model_dir: Option<&Path>,
    config: &LabrepConfig,
) -> anyhow::Result<PureOcrEngine> {
    let engine = match model_dir {
        Some(dir) => {
            debug!("Using OCR models from {}", dir.display());
            create_engine_from_dir(dir, &config.models, config.ocr.clone())
        }
        None => {
            debug!("Using OCR models from {}", config.models.model_dir.display());
            PureOcrEngine::from_config(config)
        }
    };

    engine.map_err(|e| {
        anyhow::anyhow!(
            "Failed to load OCR models from {}: {}",
            model_dir.unwrap_or(config.models.model_dir.as_path()).display(),
            e
        )
    })
}

/// How an input file is turned into report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Already-recognized OCR text.
    Text,
    /// An image that needs OCR.
    Image,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "txt" | "text" | "ocr" => Some(Self::Text),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp" => Some(Self::Image),
            _ => None,
        }
    }
}
