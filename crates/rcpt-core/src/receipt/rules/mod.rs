//! Rule cascades for receipt fields.
//!
//! Each field is extracted by an ordered list of named rules. Every rule has a
//! fixed confidence tier and the first rule that yields a value wins; partial
//! matches are never merged across rules.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod stores;

pub use amounts::AmountExtractor;
pub use dates::DateExtractor;
pub use stores::StoreExtractor;

use std::fmt;

use tracing::{debug, trace};

use super::ReceiptText;
use crate::models::receipt::ExtractedField;

type Matcher = Box<dyn Fn(&ReceiptText<'_>) -> Option<String> + Send + Sync>;

/// A named extraction rule with a fixed confidence tier.
pub struct Rule {
    name: &'static str,
    confidence: f32,
    matcher: Matcher,
}

impl Rule {
    pub fn new<F>(name: &'static str, confidence: f32, matcher: F) -> Self
    where
        F: Fn(&ReceiptText<'_>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name,
            confidence,
            matcher: Box::new(matcher),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Apply this rule alone. Empty matches count as no match.
    pub fn apply(&self, text: &ReceiptText<'_>) -> Option<ExtractedField> {
        (self.matcher)(text)
            .map(|value| ExtractedField::new(value, self.confidence))
            .filter(|field| !field.is_empty())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("confidence", &self.confidence)
            .finish()
    }
}

/// Trait for field extractors built from a rule cascade.
pub trait FieldExtractor {
    /// Field name used in logs.
    fn field(&self) -> &'static str;

    /// Rules in the order they are tried.
    fn rules(&self) -> &[Rule];

    /// Extract the field; an empty field when no rule matches.
    fn extract(&self, text: &ReceiptText<'_>) -> ExtractedField {
        run_cascade(self.field(), self.rules(), text)
    }

    /// Name of the rule that would produce the field, if any.
    fn matching_rule(&self, text: &ReceiptText<'_>) -> Option<&'static str> {
        self.rules()
            .iter()
            .find(|rule| rule.apply(text).is_some())
            .map(Rule::name)
    }
}

/// Try `rules` in order and return the first match.
pub fn run_cascade(field: &str, rules: &[Rule], text: &ReceiptText<'_>) -> ExtractedField {
    for rule in rules {
        if let Some(found) = rule.apply(text) {
            debug!(
                field,
                rule = rule.name,
                confidence = found.confidence(),
                value = found.raw_value(),
                "field matched"
            );
            return found;
        }
        trace!(field, rule = rule.name, "rule did not match");
    }

    debug!(field, "no rule matched");
    ExtractedField::empty()
}
