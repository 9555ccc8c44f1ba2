//! The signal extractor: weighted evidence combination over one record.
//!
//! Classification is a pure function of the record and the target profile.
//! Every rule fires independently and accumulates; there is no early exit,
//! because downstream consumers need the full list of contributing signals
//! for audit, not just a verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::TargetProfile;
use crate::record::RawRecord;
use crate::signal::{Polarity, Signal};

/// Ordered confidence buckets derived from the accumulated score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// Below the membership threshold.
    Low,
    /// At or above the medium threshold.
    Medium,
    /// At or above the high threshold.
    High,
    /// At or above the very-high threshold.
    VeryHigh,
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::VeryHigh => write!(f, "very_high"),
        }
    }
}

/// Why a classification did or did not produce a positive verdict.
///
/// "We don't know" must always be representable as a distinct data point,
/// never conflated with confirmed absence. The set is closed: every call
/// produces exactly one of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// An authoritative supporting signal fired.
    ConfirmedPositive,
    /// An authoritative countervailing signal fired.
    ConfirmedNegative,
    /// Every input field was empty.
    NoData,
    /// One or two fields were populated and no signal fired.
    LowData,
    /// Enough data to judge, but nothing authoritative either way.
    UncertainNeedsReview,
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfirmedPositive => write!(f, "confirmed_positive"),
            Self::ConfirmedNegative => write!(f, "confirmed_negative"),
            Self::NoData => write!(f, "no_data"),
            Self::LowData => write!(f, "low_data"),
            Self::UncertainNeedsReview => write!(f, "uncertain_needs_review"),
        }
    }
}

/// Output of classifying one record against one target profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Membership verdict.
    pub member: bool,

    /// Sum of supporting weights, capped by the profile. The score is
    /// reported even when a countervailing signal overrode the verdict.
    pub score: u32,

    /// Confidence tier for the verdict.
    pub tier: ConfidenceTier,

    /// Labels of every rule that fired, supporting and countervailing.
    pub signals: Vec<String>,

    /// Data-completeness flag.
    pub completeness: Completeness,

    /// Name of the profile that produced this result.
    pub profile: String,
}

/// Evaluates target profiles over raw records.
///
/// Stateless and `Copy`; classification may run concurrently across worker
/// threads with no shared mutable state.
///
/// # Examples
///
/// ```
/// use corroborate::{RawRecord, SignalExtractor, SourceTag, TargetProfile};
///
/// let profile = TargetProfile::china_affiliation();
/// let record = RawRecord::new(SourceTag::patents())
///     .with_country("CN")
///     .with_name("Huawei Technologies Co Ltd");
///
/// let result = SignalExtractor::new().classify(&record, &profile);
/// assert!(result.member);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalExtractor;

impl SignalExtractor {
    /// Creates an extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classifies a record against a profile.
    ///
    /// Pure function: no side effects, never fails. Missing fields are
    /// treated as empty and simply produce no signals.
    #[must_use]
    pub fn classify(&self, record: &RawRecord, profile: &TargetProfile) -> ClassificationResult {
        let fired: Vec<Signal> = profile
            .rules()
            .iter()
            .filter_map(|rule| rule.evaluate(record))
            .collect();

        let raw_score: u32 = fired
            .iter()
            .filter(|s| s.polarity == Polarity::Supporting)
            .map(|s| s.weight)
            .fold(0, u32::saturating_add);
        let score = raw_score.min(profile.score_cap());

        let countered = fired.iter().any(|s| s.polarity == Polarity::Countervailing);
        let confirmed = fired
            .iter()
            .any(|s| s.polarity == Polarity::Supporting && s.authoritative);

        // An explicit authoritative negative beats any accumulated positive
        // score; the tier is forced down with the verdict.
        let tier = if countered {
            ConfidenceTier::Low
        } else {
            profile.tiers().tier_for(score)
        };
        let member = !countered && tier >= ConfidenceTier::Medium;

        let populated = record.populated_fields();
        let completeness = if countered {
            Completeness::ConfirmedNegative
        } else if confirmed {
            Completeness::ConfirmedPositive
        } else if populated == 0 {
            Completeness::NoData
        } else if populated <= 2 && fired.is_empty() {
            Completeness::LowData
        } else {
            Completeness::UncertainNeedsReview
        };

        ClassificationResult {
            member,
            score,
            tier,
            signals: fired.into_iter().map(|s| s.label).collect(),
            completeness,
            profile: profile.name().to_string(),
        }
    }
}
