//! Rule-based layout registry for lab report fields.
//!
//! A [`PatternRegistry`] is plain data: for every [`FieldKind`] an ordered list
//! of [`FieldPattern`]s, highest priority first. Supporting a new lab layout
//! means appending an entry; the resolver never changes.

pub mod creatinine;
pub mod dates;
pub mod patterns;

use std::collections::BTreeMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Captures, Match, Regex, RegexBuilder};

use crate::error::{LabrepError, Result};

use super::FieldKind;

pub use creatinine::creatinine_layouts;
pub use dates::{date_layouts, month_of};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all candidate values for the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// One known layout for a field: a regex plus the group holding the value.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    name: String,
    regex: Regex,
    group: usize,
}

impl FieldPattern {
    /// Wrap an already compiled regex, checking that `group` exists.
    pub fn new(name: impl Into<String>, regex: Regex, group: usize) -> Result<Self> {
        let name = name.into();
        if group >= regex.captures_len() {
            return Err(LabrepError::Pattern {
                reason: format!(
                    "capture group {} does not exist (pattern has {})",
                    group,
                    regex.captures_len() - 1
                ),
                name,
            });
        }
        Ok(Self { name, regex, group })
    }

    /// Compile `source` case-insensitively.
    pub fn compile(name: impl Into<String>, source: &str, group: usize) -> Result<Self> {
        let name = name.into();
        let regex = match RegexBuilder::new(source).case_insensitive(true).build() {
            Ok(regex) => regex,
            Err(e) => {
                return Err(LabrepError::Pattern {
                    name,
                    reason: e.to_string(),
                });
            }
        };
        Self::new(name, regex, group)
    }

    /// Built-in layouts always capture group 1.
    fn builtin(name: &str, regex: &Regex) -> Self {
        Self {
            name: name.to_string(),
            regex: regex.clone(),
            group: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Leftmost match in `text`, returning the whole match and the value group.
    ///
    /// A match whose value group did not participate counts as no match.
    pub fn capture<'t>(&self, text: &'t str) -> Option<(Match<'t>, Match<'t>)> {
        let caps: Captures<'t> = self.regex.captures(text)?;
        let whole = caps.get(0)?;
        let value = caps.get(self.group)?;
        Some((whole, value))
    }
}

lazy_static! {
    static ref BUILTIN: Arc<PatternRegistry> = Arc::new(
        PatternRegistry::builder_empty()
            .extend(FieldKind::Date, date_layouts())
            .extend(FieldKind::Creatinine, creatinine_layouts())
            .build()
    );
}

/// Ordered pattern lists per field kind. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    lists: BTreeMap<FieldKind, Vec<FieldPattern>>,
}

impl PatternRegistry {
    /// The built-in lab layouts, compiled once per process.
    pub fn builtin() -> &'static PatternRegistry {
        &BUILTIN
    }

    /// Shared handle to the built-in registry.
    pub fn builtin_shared() -> Arc<PatternRegistry> {
        Arc::clone(&*BUILTIN)
    }

    /// Start from the built-in layouts.
    pub fn builder() -> PatternRegistryBuilder {
        PatternRegistryBuilder {
            registry: PatternRegistry::builtin().clone(),
        }
    }

    /// Start from an empty registry.
    pub fn builder_empty() -> PatternRegistryBuilder {
        PatternRegistryBuilder {
            registry: PatternRegistry::default(),
        }
    }

    /// Patterns for `field` in priority order; empty if none are configured.
    pub fn patterns_for(&self, field: FieldKind) -> &[FieldPattern] {
        self.lists.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Append-only builder for [`PatternRegistry`].
#[derive(Debug, Clone)]
pub struct PatternRegistryBuilder {
    registry: PatternRegistry,
}

impl PatternRegistryBuilder {
    /// Append a pattern compiled from source. It ranks after every existing pattern.
    pub fn with_pattern(
        self,
        field: FieldKind,
        name: &str,
        source: &str,
        group: usize,
    ) -> Result<Self> {
        let pattern = FieldPattern::compile(name, source, group)?;
        Ok(self.push(field, pattern))
    }

    /// Append an already built pattern.
    pub fn push(mut self, field: FieldKind, pattern: FieldPattern) -> Self {
        self.registry.lists.entry(field).or_default().push(pattern);
        self
    }

    fn extend(mut self, field: FieldKind, patterns: Vec<FieldPattern>) -> Self {
        self.registry.lists.entry(field).or_default().extend(patterns);
        self
    }

    pub fn build(self) -> PatternRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = PatternRegistry::builtin();

        let dates: Vec<&str> = registry
            .patterns_for(FieldKind::Date)
            .iter()
            .map(FieldPattern::name)
            .collect();
        assert_eq!(dates, ["reported-date-label", "reported-colon", "reported-noise"]);

        let creatinine: Vec<&str> = registry
            .patterns_for(FieldKind::Creatinine)
            .iter()
            .map(FieldPattern::name)
            .collect();
        assert_eq!(
            creatinine,
            ["creatinine-serum", "creatinine-range", "creatinine-blood", "creatinine-optional-range"]
        );
    }

    #[test]
    fn test_unconfigured_field_is_empty() {
        let registry = PatternRegistry::builder_empty()
            .with_pattern(FieldKind::Date, "iso", r"(\d{4}-\d{2}-\d{2})", 1)
            .unwrap()
            .build();

        assert!(registry.patterns_for(FieldKind::Creatinine).is_empty());
        assert_eq!(registry.patterns_for(FieldKind::Date).len(), 1);
    }

    #[test]
    fn test_compiled_patterns_ignore_case() {
        let pattern = FieldPattern::compile("creat", r"s\.creat\s+([0-9.]+)", 1).unwrap();
        let (_, value) = pattern.capture("S.CREAT 0.7").unwrap();
        assert_eq!(value.as_str(), "0.7");
    }

    #[test]
    fn test_missing_group_rejected() {
        let err = FieldPattern::compile("no-group", r"Creat\s+[0-9.]+", 1).unwrap_err();
        assert!(matches!(err, LabrepError::Pattern { .. }));
    }

    #[test]
    fn test_non_participating_group_is_no_match() {
        let pattern = FieldPattern::compile("alt", r"Creat(?:\s+([0-9.]+)|inine)", 1).unwrap();
        assert!(pattern.capture("Creatinine").is_none());
        assert!(pattern.capture("Creat 1.4").is_some());
    }
}
