//! Lab report parser: resolve both fields, derive the month, assemble.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::report::{ExtractedField, ReportResult};

use super::FieldKind;
use super::resolver::{FieldMatch, FieldResolver};
use super::rules::{FieldExtractor, PatternRegistry, month_of};

/// Result of report extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted report fields.
    pub report: ReportResult,
    /// Winning pattern per resolved field.
    pub matches: Vec<FieldMatch>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// The winning match for `field`, if it was resolved.
    pub fn match_for(&self, field: FieldKind) -> Option<&FieldMatch> {
        self.matches.iter().find(|m| m.field == field)
    }
}

/// Parses OCR text of a single lab report.
///
/// Holds only an immutable registry, so one parser can be shared across
/// threads and requests.
#[derive(Debug, Clone)]
pub struct ReportParser {
    registry: Arc<PatternRegistry>,
}

impl ReportParser {
    /// Create a parser over the built-in layouts.
    pub fn new() -> Self {
        Self {
            registry: PatternRegistry::builtin_shared(),
        }
    }

    /// Create a parser over a custom registry.
    pub fn with_registry(registry: impl Into<Arc<PatternRegistry>>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    /// Parse report text. Never fails; missing fields are `NotFound`.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        let date_match = FieldResolver::new(&self.registry, FieldKind::Date).extract(text);
        let creatinine_match =
            FieldResolver::new(&self.registry, FieldKind::Creatinine).extract(text);

        let reported_date = ExtractedField::from(date_match.as_ref().map(|m| m.value.clone()));
        let serum_creatinine =
            ExtractedField::from(creatinine_match.as_ref().map(|m| m.value.clone()));
        let month = month_of(&reported_date);

        let matches: Vec<FieldMatch> = date_match.into_iter().chain(creatinine_match).collect();
        for m in &matches {
            debug!(
                "{} matched layout '{}' at {}..{}: {}",
                m.field, m.pattern, m.position.0, m.position.1, m.value
            );
        }

        let report = assemble(reported_date, month, serum_creatinine);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extracted report: date={}, month={}, creatinine={} ({} chars, {}ms)",
            report.reported_date,
            report.month,
            report.serum_creatinine,
            text.len(),
            processing_time_ms
        );

        ExtractionResult {
            report,
            matches,
            processing_time_ms,
        }
    }
}

impl ReportParser {
    /// Every layout for `field` that matches `text`, in priority order.
    ///
    /// The first entry is the one [`parse`](Self::parse) uses; the rest are
    /// shadowed by it.
    pub fn candidates(&self, text: &str, field: FieldKind) -> Vec<FieldMatch> {
        FieldResolver::new(&self.registry, field).extract_all(text)
    }
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Package the three fields into a [`ReportResult`].
pub fn assemble(
    date: ExtractedField,
    month: ExtractedField,
    creatinine: ExtractedField,
) -> ReportResult {
    ReportResult {
        reported_date: date,
        month,
        serum_creatinine: creatinine,
    }
}
