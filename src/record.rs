//! Raw records as delivered by the collector layer.
//!
//! The engine has no opinion on transport or file format. Collectors parse
//! whatever they fetch into this fixed field shape; missing fields default
//! to the empty string and never cause an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::SourceTag;

/// The fixed set of named fields a raw record exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Country or region code.
    Country,
    /// Free-text entity name.
    Name,
    /// Free-text address.
    Address,
    /// Postal code.
    PostalCode,
    /// Free-text description.
    Description,
}

impl FieldKind {
    /// All record fields, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Country,
        Self::Name,
        Self::Address,
        Self::PostalCode,
        Self::Description,
    ];
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Country => write!(f, "country"),
            Self::Name => write!(f, "name"),
            Self::Address => write!(f, "address"),
            Self::PostalCode => write!(f, "postal_code"),
            Self::Description => write!(f, "description"),
        }
    }
}

/// One noisy textual record from an external collector.
///
/// # Examples
///
/// ```
/// use corroborate::{RawRecord, SourceTag};
///
/// let record = RawRecord::new(SourceTag::patents())
///     .with_country("CN")
///     .with_name("Huawei Technologies Co Ltd");
/// assert_eq!(record.populated_fields(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Country or region code, as reported by the collector.
    #[serde(default)]
    pub country: String,

    /// Free-text entity name.
    #[serde(default)]
    pub name: String,

    /// Free-text address.
    #[serde(default)]
    pub address: String,

    /// Postal code.
    #[serde(default)]
    pub postal_code: String,

    /// Free-text description (abstract, filing text, contract summary).
    #[serde(default)]
    pub description: String,

    /// Which collector produced this record.
    #[serde(default)]
    pub source: SourceTag,
}

impl RawRecord {
    /// Creates an empty record attributed to `source`.
    #[must_use]
    pub fn new(source: SourceTag) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Sets the country field.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Sets the name field.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the address field.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Sets the postal-code field.
    #[must_use]
    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = postal_code.into();
        self
    }

    /// Sets the description field.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the text of the requested field.
    #[must_use]
    pub fn field(&self, kind: FieldKind) -> &str {
        match kind {
            FieldKind::Country => &self.country,
            FieldKind::Name => &self.name,
            FieldKind::Address => &self.address,
            FieldKind::PostalCode => &self.postal_code,
            FieldKind::Description => &self.description,
        }
    }

    /// Counts fields holding at least one non-whitespace character.
    #[must_use]
    pub fn populated_fields(&self) -> usize {
        FieldKind::ALL
            .iter()
            .filter(|kind| !self.field(**kind).trim().is_empty())
            .count()
    }

    /// Returns true if every field is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.populated_fields() == 0
    }
}
