//! Evidence signals and the weighted rules that produce them.
//!
//! A signal is a single named piece of proof extracted from one field of a
//! raw record. Signals are ephemeral: computed per classification call, never
//! persisted. Their labels survive in the classification result as an
//! audit trail.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::record::{FieldKind, RawRecord};

/// Whether a signal argues for or against target membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Evidence toward membership; contributes its weight to the score.
    Supporting,
    /// Evidence against membership. A single fired countervailing signal
    /// forces a non-member verdict regardless of the accumulated score.
    Countervailing,
}

impl Default for Polarity {
    fn default() -> Self {
        Self::Supporting
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supporting => write!(f, "supporting"),
            Self::Countervailing => write!(f, "countervailing"),
        }
    }
}

/// A fired piece of evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Label of the rule that fired (the audit-trail name).
    pub label: String,
    /// Point weight the rule carries.
    pub weight: u32,
    /// Polarity of the rule.
    pub polarity: Polarity,
    /// Whether the rule is authoritative for the completeness flag.
    pub authoritative: bool,
    /// Which field the evidence came from.
    pub field: FieldKind,
}

/// A weighted pattern rule evaluated against one field of a record.
///
/// Rules are compiled once at profile load; an invalid pattern is a
/// configuration error, raised before any record is classified.
#[derive(Debug, Clone)]
pub struct SignalRule {
    label: String,
    field: FieldKind,
    pattern: Regex,
    weight: u32,
    polarity: Polarity,
    authoritative: bool,
}

impl SignalRule {
    /// Compiles a rule. Patterns match case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidPattern` if the pattern does not
    /// compile.
    pub fn new(
        label: impl Into<String>,
        field: FieldKind,
        pattern: &str,
        weight: u32,
        polarity: Polarity,
        authoritative: bool,
    ) -> Result<Self, ConfigurationError> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigurationError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            label: label.into(),
            field,
            pattern: compiled,
            weight,
            polarity,
            authoritative,
        })
    }

    /// Label of this rule.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Field this rule inspects.
    #[must_use]
    pub const fn field(&self) -> FieldKind {
        self.field
    }

    /// Point weight of this rule.
    #[must_use]
    pub const fn weight(&self) -> u32 {
        self.weight
    }

    /// Polarity of this rule.
    #[must_use]
    pub const fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Whether this rule is authoritative.
    #[must_use]
    pub const fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    /// Evaluates this rule against a record, returning the fired signal.
    ///
    /// An empty field never fires: absence of data is not evidence.
    #[must_use]
    pub fn evaluate(&self, record: &RawRecord) -> Option<Signal> {
        let text = record.field(self.field).trim();
        if text.is_empty() || !self.pattern.is_match(text) {
            return None;
        }

        Some(Signal {
            label: self.label.clone(),
            weight: self.weight,
            polarity: self.polarity,
            authoritative: self.authoritative,
            field: self.field,
        })
    }
}
