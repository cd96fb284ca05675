//! First-match-wins field resolution over a pattern registry.

use serde::Serialize;
use tracing::trace;

use crate::models::report::ExtractedField;

use super::FieldKind;
use super::rules::{FieldExtractor, PatternRegistry};

/// Which layout produced a field value, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    /// Field kind.
    pub field: FieldKind,
    /// Name of the winning pattern.
    pub pattern: String,
    /// Raw captured value.
    pub value: String,
    /// Byte span of the whole match in the source text.
    pub position: (usize, usize),
}

/// Resolves one field by trying its patterns in priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'r> {
    registry: &'r PatternRegistry,
    field: FieldKind,
}

impl<'r> FieldResolver<'r> {
    pub fn new(registry: &'r PatternRegistry, field: FieldKind) -> Self {
        Self { registry, field }
    }

    /// The first pattern that matches anywhere in `text` wins. Within that
    /// pattern the leftmost occurrence is used.
    pub fn resolve(&self, text: &str) -> ExtractedField {
        self.extract(text)
            .map(|m| ExtractedField::Found(m.value))
            .unwrap_or(ExtractedField::NotFound)
    }
}

impl FieldResolver<'static> {
    /// Resolver over the built-in layouts.
    pub fn builtin(field: FieldKind) -> Self {
        Self::new(PatternRegistry::builtin(), field)
    }
}

impl FieldExtractor for FieldResolver<'_> {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.registry
            .patterns_for(self.field)
            .iter()
            .find_map(|pattern| {
                let (whole, value) = pattern.capture(text)?;
                Some(FieldMatch {
                    field: self.field,
                    pattern: pattern.name().to_string(),
                    value: value.as_str().to_string(),
                    position: (whole.start(), whole.end()),
                })
            })
            .inspect(|m| trace!(field = %m.field, pattern = %m.pattern, "pattern matched"))
    }

    /// One candidate per matching pattern, in priority order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.registry
            .patterns_for(self.field)
            .iter()
            .filter_map(|pattern| {
                let (whole, value) = pattern.capture(text)?;
                Some(FieldMatch {
                    field: self.field,
                    pattern: pattern.name().to_string(),
                    value: value.as_str().to_string(),
                    position: (whole.start(), whole.end()),
                })
            })
            .collect()
    }
}

/// Winning built-in layout for `field` in `text`, with its position.
pub fn resolve_match(text: &str, field: FieldKind) -> Option<FieldMatch> {
    FieldResolver::builtin(field).extract(text)
}

/// Resolve `field` in `text` using the built-in layouts.
pub fn resolve(text: &str, field: FieldKind) -> ExtractedField {
    resolve_match(text, field)
        .map(|m| ExtractedField::Found(m.value))
        .unwrap_or(ExtractedField::NotFound)
}
