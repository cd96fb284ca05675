//! Error types for the labrep-core library.
//!
//! Field extraction itself never fails: a missing field is
//! [`ExtractedField::NotFound`](crate::ExtractedField::NotFound). These errors
//! cover the collaborators around it (OCR, files, configuration) and
//! construction of custom pattern registries.

use thiserror::Error;

/// Main error type for the labrep library.
#[derive(Error, Debug)]
pub enum LabrepError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// A layout pattern could not be registered.
    #[error("invalid pattern '{name}': {reason}")]
    Pattern { name: String, reason: String },

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised at the OCR boundary.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The engine failed while recognizing text.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Image bytes could not be decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for the labrep library.
pub type Result<T> = std::result::Result<T, LabrepError>;
