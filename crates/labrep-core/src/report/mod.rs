//! Lab report field extraction.

mod parser;
mod resolver;
pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use parser::{ExtractionResult, ReportParser, assemble};
pub use resolver::{FieldMatch, FieldResolver, resolve, resolve_match};
pub use rules::{FieldExtractor, FieldPattern, PatternRegistry, PatternRegistryBuilder, month_of};

/// The fields extracted from a lab report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Date the report was issued.
    Date,
    /// Serum creatinine value.
    Creatinine,
}

impl FieldKind {
    pub const ALL: [FieldKind; 2] = [FieldKind::Date, FieldKind::Creatinine];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Date => "date",
            FieldKind::Creatinine => "creatinine",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
