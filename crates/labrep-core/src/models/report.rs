//! Lab report data models.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Rendering of [`ExtractedField::NotFound`] in every external format.
pub const NOT_FOUND: &str = "Not found";

/// A single extracted field: either a raw captured value or the sentinel.
///
/// Serializes as a plain string, with `NotFound` rendered as `"Not found"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ExtractedField {
    /// The field was located; holds the raw captured text.
    Found(String),
    /// No pattern produced a value.
    #[default]
    NotFound,
}

impl ExtractedField {
    pub fn found(value: impl Into<String>) -> Self {
        Self::Found(value.into())
    }

    /// Get the captured value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Render the field the way it appears in JSON, CSV and text output.
    pub fn as_display(&self) -> &str {
        self.value().unwrap_or(NOT_FOUND)
    }
}

impl From<Option<String>> for ExtractedField {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

impl fmt::Display for ExtractedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_display())
    }
}

impl Serialize for ExtractedField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_display())
    }
}

impl<'de> Deserialize<'de> for ExtractedField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldVisitor;

        impl Visitor<'_> for FieldVisitor {
            type Value = ExtractedField;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an extracted value or \"Not found\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v == NOT_FOUND {
                    Ok(ExtractedField::NotFound)
                } else {
                    Ok(ExtractedField::Found(v.to_string()))
                }
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ExtractedField::NotFound)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ExtractedField::NotFound)
            }
        }

        deserializer.deserialize_any(FieldVisitor)
    }
}

/// Structured result for one lab report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    /// Report date as printed, e.g. `05/03/2024`.
    pub reported_date: ExtractedField,

    /// Lowercase English month name derived from the report date.
    pub month: ExtractedField,

    /// Serum creatinine value as printed, without units.
    pub serum_creatinine: ExtractedField,
}

impl ReportResult {
    /// True when none of the fields could be extracted.
    pub fn is_empty(&self) -> bool {
        !self.reported_date.is_found() && !self.month.is_found() && !self.serum_creatinine.is_found()
    }

    /// Human-readable multi-line summary.
    pub fn format_text(&self) -> String {
        format!(
            "Reported date:    {}\nMonth:            {}\nSerum creatinine: {}\n",
            self.reported_date, self.month, self.serum_creatinine
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_not_found_serializes_as_sentinel() {
        let report = ReportResult {
            reported_date: ExtractedField::found("12/11/2022"),
            month: ExtractedField::found("november"),
            serum_creatinine: ExtractedField::NotFound,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"reportedDate":"12/11/2022","month":"november","serumCreatinine":"Not found"}"#
        );
    }

    #[test]
    fn test_deserialize_sentinel() {
        let report: ReportResult = serde_json::from_str(
            r#"{"reportedDate":"Not found","month":"Not found","serumCreatinine":"0.9"}"#,
        )
        .unwrap();

        assert_eq!(report.reported_date, ExtractedField::NotFound);
        assert_eq!(report.serum_creatinine, ExtractedField::found("0.9"));
        assert!(!report.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        let report = ReportResult::default();
        assert!(report.is_empty());
        assert_eq!(report.month.to_string(), "Not found");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(ExtractedField::from(Some("1.2".to_string())).value(), Some("1.2"));
        assert_eq!(ExtractedField::from(None), ExtractedField::NotFound);
    }
}
