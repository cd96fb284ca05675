//! Serum creatinine layouts.

use super::FieldPattern;
use super::patterns::{
    CREATININE_BLOOD, CREATININE_OPTIONAL_RANGE, CREATININE_RANGE, CREATININE_SERUM,
};

/// Built-in serum creatinine layouts, highest priority first.
///
/// `creatinine-range` and `creatinine-optional-range` overlap; the order is
/// kept as observed on the source reports.
pub fn creatinine_layouts() -> Vec<FieldPattern> {
    vec![
        // Creatinine- Serum 1.2
        FieldPattern::builtin("creatinine-serum", &CREATININE_SERUM),
        // CREATININE 0.9 0.6-1.3 mg/dL
        FieldPattern::builtin("creatinine-range", &CREATININE_RANGE),
        // CREATININE-BLOOD (CREATININE) 1.05 mg/dL
        FieldPattern::builtin("creatinine-blood", &CREATININE_BLOOD),
        // CREATININE 1.1 mg/dL
        FieldPattern::builtin("creatinine-optional-range", &CREATININE_OPTIONAL_RANGE),
    ]
}
