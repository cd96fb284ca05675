//! Report date layouts and month normalization.

use chrono::Month;

use crate::models::report::ExtractedField;

use super::FieldPattern;
use super::patterns::{REPORTED_COLON, REPORTED_DATE_LABEL, REPORTED_NOISE};

/// Built-in report date layouts, highest priority first.
pub fn date_layouts() -> Vec<FieldPattern> {
    vec![
        // Reported Date: DD/MM/YYYY
        FieldPattern::builtin("reported-date-label", &REPORTED_DATE_LABEL),
        // REPORTED : DD/MM/YYYY
        FieldPattern::builtin("reported-colon", &REPORTED_COLON),
        // REPORTED © DD/MM/YYYY
        FieldPattern::builtin("reported-noise", &REPORTED_NOISE),
    ]
}

/// Map a `DD/MM/YYYY` date to its lowercase English month name.
///
/// `NotFound` propagates. A date that does not split into exactly three
/// `/`-separated parts, or whose month is not in `1..=12`, yields `NotFound`.
/// Day and year are not validated.
pub fn month_of(date: &ExtractedField) -> ExtractedField {
    let Some(raw) = date.value() else {
        return ExtractedField::NotFound;
    };

    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return ExtractedField::NotFound;
    }

    parts[1]
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(|n| Month::try_from(n).ok())
        .map(|month| ExtractedField::Found(month.name().to_lowercase()))
        .unwrap_or(ExtractedField::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];

    #[test]
    fn test_every_month() {
        for (i, name) in MONTHS.iter().enumerate() {
            let date = ExtractedField::found(format!("01/{:02}/2023", i + 1));
            assert_eq!(month_of(&date), ExtractedField::found(*name));
        }
    }

    #[test]
    fn test_out_of_range_month() {
        for month in [0, 13, 99] {
            let date = ExtractedField::found(format!("01/{:02}/2023", month));
            assert_eq!(month_of(&date), ExtractedField::NotFound);
        }
    }

    #[test]
    fn test_not_found_propagates() {
        assert_eq!(month_of(&ExtractedField::NotFound), ExtractedField::NotFound);
    }

    #[test]
    fn test_wrong_segment_count() {
        assert_eq!(month_of(&ExtractedField::found("05/03")), ExtractedField::NotFound);
        assert_eq!(month_of(&ExtractedField::found("05/03/2024/1")), ExtractedField::NotFound);
        assert_eq!(month_of(&ExtractedField::found("")), ExtractedField::NotFound);
    }

    #[test]
    fn test_non_numeric_month() {
        assert_eq!(month_of(&ExtractedField::found("05/ab/2024")), ExtractedField::NotFound);
        assert_eq!(month_of(&ExtractedField::found("05/300/2024")), ExtractedField::NotFound);
    }

    #[test]
    fn test_day_is_not_validated() {
        assert_eq!(month_of(&ExtractedField::found("32/12/2024")), ExtractedField::found("december"));
        assert_eq!(month_of(&ExtractedField::found("32/13/2024")), ExtractedField::NotFound);
    }
}
