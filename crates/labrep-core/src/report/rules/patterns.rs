//! Regex patterns for known lab report layouts.
//!
//! Every pattern captures the field value in group 1. Digits are ASCII only
//! (`[0-9]`, not the Unicode-aware `\d`).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Report date. OCR drops letters from the label, so "Dte" and "Dat" occur.
    pub static ref REPORTED_DATE_LABEL: Regex = Regex::new(
        r"(?i)Reported\s+D[ae]?te?[:\s]*([0-9]{2}/[0-9]{2}/[0-9]{4})"
    ).unwrap();

    pub static ref REPORTED_COLON: Regex = Regex::new(
        r"(?i)REPORTED\s*:\s*([0-9]{2}/[0-9]{2}/[0-9]{4})"
    ).unwrap();

    // The colon is sometimes read as a copyright glyph, or its Latin-1 mojibake "Â©".
    pub static ref REPORTED_NOISE: Regex = Regex::new(
        r"(?i)REPORTED\s*[Â©:]{0,2}\s*([0-9]{2}/[0-9]{2}/[0-9]{4})"
    ).unwrap();

    // Serum creatinine
    pub static ref CREATININE_SERUM: Regex = Regex::new(
        r"(?i)Creatinine-\s*Serum\s+([0-9.]+)"
    ).unwrap();

    pub static ref CREATININE_RANGE: Regex = Regex::new(
        r"(?i)CREATININE\s+([0-9.]+)\s+(?:[0-9.-]+\s+mg/dL)?"
    ).unwrap();

    pub static ref CREATININE_BLOOD: Regex = Regex::new(
        r"(?i)CREATININE-(?:BLOOD)?\s*\(?CREATININE\)?\s*([0-9.]+)\s*mg/dL"
    ).unwrap();

    pub static ref CREATININE_OPTIONAL_RANGE: Regex = Regex::new(
        r"(?i)CREATININE\s+([0-9.]+)\s+(?:[0-9.-]+\s+)?mg/dL"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
        re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
    }

    #[test]
    fn test_reported_date_label_variants() {
        assert_eq!(capture(&REPORTED_DATE_LABEL, "Reported Date: 05/03/2024"), Some("05/03/2024"));
        assert_eq!(capture(&REPORTED_DATE_LABEL, "REPORTED DTE 05/03/2024"), Some("05/03/2024"));
        assert_eq!(capture(&REPORTED_DATE_LABEL, "Reported Dat :  05/03/2024"), Some("05/03/2024"));
        assert_eq!(capture(&REPORTED_DATE_LABEL, "Reported : 05/03/2024"), None);
    }

    #[test]
    fn test_reported_colon() {
        assert_eq!(capture(&REPORTED_COLON, "REPORTED : 12/11/2022"), Some("12/11/2022"));
        assert_eq!(capture(&REPORTED_COLON, "reported:12/11/2022"), Some("12/11/2022"));
        assert_eq!(capture(&REPORTED_COLON, "REPORTED © 12/11/2022"), None);
    }

    #[test]
    fn test_reported_noise_glyph() {
        assert_eq!(capture(&REPORTED_NOISE, "REPORTED © 14/07/2023"), Some("14/07/2023"));
        assert_eq!(capture(&REPORTED_NOISE, "REPORTED Â© 14/07/2023"), Some("14/07/2023"));
        assert_eq!(capture(&REPORTED_NOISE, "REPORTED 14/07/2023"), Some("14/07/2023"));
    }

    #[test]
    fn test_creatinine_serum() {
        assert_eq!(capture(&CREATININE_SERUM, "Creatinine- Serum 1.2"), Some("1.2"));
        assert_eq!(capture(&CREATININE_SERUM, "CREATININE-SERUM   0.84 mg/dL"), Some("0.84"));
    }

    #[test]
    fn test_creatinine_with_range() {
        assert_eq!(capture(&CREATININE_RANGE, "CREATININE 0.9 0.6-1.3 mg/dL"), Some("0.9"));
        // The value must be followed by whitespace.
        assert_eq!(capture(&CREATININE_RANGE, "CREATININE 0.9"), None);
    }

    #[test]
    fn test_creatinine_blood() {
        assert_eq!(
            capture(&CREATININE_BLOOD, "CREATININE-BLOOD (CREATININE) 1.05 mg/dL"),
            Some("1.05")
        );
        assert_eq!(capture(&CREATININE_BLOOD, "Creatinine-Creatinine 1.05mg/dl"), Some("1.05"));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        // Arabic-Indic and fullwidth digits.
        assert_eq!(capture(&REPORTED_DATE_LABEL, "Reported Date: ٠٥/٠٣/٢٠٢٤"), None);
        assert_eq!(capture(&REPORTED_COLON, "REPORTED : １２/１１/２０２２"), None);
        assert_eq!(capture(&REPORTED_NOISE, "REPORTED © ١٤/٠٧/٢٠٢٣"), None);
        assert_eq!(
            capture(&CREATININE_BLOOD, "CREATININE-BLOOD (CREATININE) １.０５ mg/dL"),
            None
        );
    }

    #[test]
    fn test_creatinine_optional_range() {
        assert_eq!(capture(&CREATININE_OPTIONAL_RANGE, "CREATININE 1.1 mg/dL"), Some("1.1"));
        assert_eq!(
            capture(&CREATININE_OPTIONAL_RANGE, "CREATININE 1.1 0.7-1.4 mg/dL"),
            Some("1.1")
        );
    }
}
