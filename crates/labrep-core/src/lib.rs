//! Core library for lab report OCR processing.
//!
//! This crate provides:
//! - A prioritized pattern registry describing known lab report layouts
//! - Field resolution for the report date and serum creatinine value
//! - Month normalization and assembly into a serializable [`ReportResult`]
//! - An OCR seam ([`TextRecognizer`]) with a `pure-onnx-ocr` backed engine
//!
//! ```
//! let report = labrep_core::extract("Reported Date: 05/03/2024\nCreatinine- Serum 1.2");
//! assert_eq!(report.month.value(), Some("march"));
//! ```

pub mod error;
pub mod models;
pub mod ocr;
pub mod report;

pub use error::{LabrepError, OcrError, Result};
pub use models::config::LabrepConfig;
pub use models::report::{ExtractedField, ReportResult};
pub use ocr::{OcrResult, TextBox, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::{PureOcrEngine, create_engine_from_dir};
pub use report::{
    ExtractionResult, FieldKind, FieldMatch, FieldPattern, PatternRegistry, ReportParser,
    assemble, month_of, resolve, resolve_match,
};

/// Extract a [`ReportResult`] from OCR text using the built-in layouts.
pub fn extract(text: &str) -> ReportResult {
    ReportParser::new().parse(text).report
}
