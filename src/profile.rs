//! Target profiles: the configuration of one classification target.
//!
//! A profile bundles the weighted signal rules and tier thresholds for one
//! classification target (e.g. "Chinese-affiliated entity"). Profiles are
//! loaded once, validated eagerly, and treated as immutable for the
//! duration of a batch. The same extractor runs any profile; swapping
//! lexicons or weights requires no code change.

use serde::{Deserialize, Serialize};

use crate::classify::ConfidenceTier;
use crate::error::ConfigurationError;
use crate::record::FieldKind;
use crate::signal::{Polarity, SignalRule};

/// Default cap applied to the accumulated supporting score.
pub const DEFAULT_SCORE_CAP: u32 = 150;

const fn default_score_cap() -> u32 {
    DEFAULT_SCORE_CAP
}

/// Score thresholds mapping monotonically onto confidence tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Minimum score for [`ConfidenceTier::Medium`].
    pub medium: u32,
    /// Minimum score for [`ConfidenceTier::High`].
    pub high: u32,
    /// Minimum score for [`ConfidenceTier::VeryHigh`].
    pub very_high: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium: 50,
            high: 70,
            very_high: 100,
        }
    }
}

impl TierThresholds {
    /// Validates that thresholds are positive and non-decreasing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::NonMonotonicTiers` otherwise.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.medium == 0 || self.medium > self.high || self.high > self.very_high {
            return Err(ConfigurationError::NonMonotonicTiers {
                medium: self.medium,
                high: self.high,
                very_high: self.very_high,
            });
        }
        Ok(())
    }

    /// Maps a score onto its tier.
    #[must_use]
    pub fn tier_for(&self, score: u32) -> ConfidenceTier {
        if score >= self.very_high {
            ConfidenceTier::VeryHigh
        } else if score >= self.high {
            ConfidenceTier::High
        } else if score >= self.medium {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Serde-facing rule definition, uncompiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Audit-trail label for the rule.
    pub label: String,
    /// Record field the rule inspects.
    pub field: FieldKind,
    /// Case-insensitive regex pattern.
    pub pattern: String,
    /// Point weight.
    pub weight: u32,

    /// Polarity; defaults to supporting.
    #[serde(default)]
    pub polarity: Polarity,

    /// Whether a fire confirms the verdict for the completeness flag.
    #[serde(default)]
    pub authoritative: bool,
}

/// Serde-facing profile definition, uncompiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// Profile name, carried into every classification result.
    pub name: String,

    /// Signal rules; an empty list fails validation.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,

    /// Tier thresholds.
    #[serde(default)]
    pub tiers: TierThresholds,

    /// Cap on the accumulated supporting score.
    #[serde(default = "default_score_cap")]
    pub score_cap: u32,
}

/// A compiled, validated classification target.
#[derive(Debug, Clone)]
pub struct TargetProfile {
    name: String,
    rules: Vec<SignalRule>,
    tiers: TierThresholds,
    score_cap: u32,
}

impl TargetProfile {
    /// Compiles and validates a profile spec.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::NoRules` if the spec defines no rules
    /// - `ConfigurationError::InvalidPattern` on the first bad pattern
    /// - `ConfigurationError::NonMonotonicTiers` on bad thresholds
    pub fn from_spec(spec: ProfileSpec) -> Result<Self, ConfigurationError> {
        if spec.rules.is_empty() {
            return Err(ConfigurationError::NoRules { profile: spec.name });
        }
        spec.tiers.validate()?;

        let mut rules = Vec::with_capacity(spec.rules.len());
        for rule in &spec.rules {
            rules.push(SignalRule::new(
                rule.label.clone(),
                rule.field,
                &rule.pattern,
                rule.weight,
                rule.polarity,
                rule.authoritative,
            )?);
        }

        Ok(Self {
            name: spec.name,
            rules,
            tiers: spec.tiers,
            score_cap: spec.score_cap,
        })
    }

    /// Parses and compiles a profile from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MalformedProfile` on parse failure, plus
    /// everything [`TargetProfile::from_spec`] can return.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let spec: ProfileSpec =
            serde_json::from_str(json).map_err(|e| ConfigurationError::MalformedProfile {
                reason: e.to_string(),
            })?;
        Self::from_spec(spec)
    }

    /// Profile name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled signal rules.
    #[must_use]
    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }

    /// Tier thresholds.
    #[must_use]
    pub const fn tiers(&self) -> TierThresholds {
        self.tiers
    }

    /// Score cap.
    #[must_use]
    pub const fn score_cap(&self) -> u32 {
        self.score_cap
    }

    /// The reference China-affiliation profile.
    ///
    /// This is the lexicon the collector scripts previously each carried a
    /// drifting copy of: authoritative country codes, known state-linked
    /// companies, defence-affiliated institutions, toponym keywords, and the
    /// six-digit postal pattern. Countervailing country codes cover the
    /// jurisdictions the collectors most often see instead.
    #[must_use]
    pub fn china_affiliation() -> Self {
        let spec = ProfileSpec {
            name: "china_affiliation".to_string(),
            rules: vec![
                RuleSpec {
                    label: "country_code_cn".to_string(),
                    field: FieldKind::Country,
                    pattern: r"^(cn|chn|china|prc|people's republic of china|hk|hkg|hong\s?kong|mo|mac|macau)$".to_string(),
                    weight: 100,
                    polarity: Polarity::Supporting,
                    authoritative: true,
                },
                RuleSpec {
                    label: "country_code_foreign".to_string(),
                    field: FieldKind::Country,
                    pattern: r"^(us|usa|united states|jp|jpn|japan|kr|kor|south korea|de|deu|germany|fr|fra|france|gb|gbr|uk|united kingdom|tw|twn|taiwan|ca|can|canada|au|aus|australia|in|ind|india|nl|nld|netherlands|ch|che|switzerland|se|swe|sweden|sg|sgp|singapore)$".to_string(),
                    weight: 100,
                    polarity: Polarity::Countervailing,
                    authoritative: true,
                },
                RuleSpec {
                    label: "known_company".to_string(),
                    field: FieldKind::Name,
                    pattern: r"huawei|zte|hikvision|dahua|tencent|alibaba|baidu|xiaomi|lenovo|sinopec|cnooc|cosco|norinco|avic|comac|cetc|casc|casic|smic|byd|catl|china\s+(mobile|telecom|unicom|shipping|railway|electronics|aerospace|shipbuilding|nuclear)".to_string(),
                    weight: 60,
                    polarity: Polarity::Supporting,
                    authoritative: true,
                },
                RuleSpec {
                    label: "known_institution".to_string(),
                    field: FieldKind::Name,
                    pattern: r"chinese academy of sciences|tsinghua|peking university|fudan|zhejiang university|shanghai jiao\s?tong|harbin (institute|engineering)|beihang|beijing institute of technology|northwestern polytechnical|nanjing university of (aeronautics|science)|university of electronic science".to_string(),
                    weight: 60,
                    polarity: Polarity::Supporting,
                    authoritative: true,
                },
                RuleSpec {
                    label: "name_keyword".to_string(),
                    field: FieldKind::Name,
                    pattern: r"\b(china|chinese|sino|beijing|shanghai|shenzhen|guangzhou|wuhan|chengdu|tianjin)\b".to_string(),
                    weight: 30,
                    polarity: Polarity::Supporting,
                    authoritative: false,
                },
                RuleSpec {
                    label: "address_keyword".to_string(),
                    field: FieldKind::Address,
                    pattern: r"\b(china|prc|beijing|shanghai|shenzhen|guangzhou|haidian|pudong|nanshan)\b".to_string(),
                    weight: 25,
                    polarity: Polarity::Supporting,
                    authoritative: false,
                },
                RuleSpec {
                    label: "postal_pattern_match".to_string(),
                    field: FieldKind::PostalCode,
                    pattern: r"^\d{6}$".to_string(),
                    weight: 15,
                    polarity: Polarity::Supporting,
                    authoritative: false,
                },
                RuleSpec {
                    label: "description_keyword".to_string(),
                    field: FieldKind::Description,
                    pattern: r"\b(china|chinese|prc|beijing|shanghai|shenzhen)\b".to_string(),
                    weight: 20,
                    polarity: Polarity::Supporting,
                    authoritative: false,
                },
            ],
            tiers: TierThresholds::default(),
            score_cap: DEFAULT_SCORE_CAP,
        };

        Self::from_spec(spec).expect("built-in profile must compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_rejected() {
        let spec = ProfileSpec {
            name: "empty".to_string(),
            rules: Vec::new(),
            tiers: TierThresholds::default(),
            score_cap: DEFAULT_SCORE_CAP,
        };
        let err = TargetProfile::from_spec(spec).unwrap_err();
        assert!(matches!(err, ConfigurationError::NoRules { .. }));
    }

    #[test]
    fn test_non_monotonic_tiers_rejected() {
        let tiers = TierThresholds {
            medium: 80,
            high: 70,
            very_high: 100,
        };
        assert!(tiers.validate().is_err());

        let zero_medium = TierThresholds {
            medium: 0,
            high: 70,
            very_high: 100,
        };
        assert!(zero_medium.validate().is_err());
    }

    #[test]
    fn test_tier_mapping() {
        let tiers = TierThresholds::default();
        assert_eq!(tiers.tier_for(120), ConfidenceTier::VeryHigh);
        assert_eq!(tiers.tier_for(100), ConfidenceTier::VeryHigh);
        assert_eq!(tiers.tier_for(85), ConfidenceTier::High);
        assert_eq!(tiers.tier_for(50), ConfidenceTier::Medium);
        assert_eq!(tiers.tier_for(49), ConfidenceTier::Low);
        assert_eq!(tiers.tier_for(0), ConfidenceTier::Low);
    }

    #[test]
    fn test_bad_pattern_rejected_at_load() {
        let spec = ProfileSpec {
            name: "broken".to_string(),
            rules: vec![RuleSpec {
                label: "bad".to_string(),
                field: FieldKind::Name,
                pattern: "(open".to_string(),
                weight: 10,
                polarity: Polarity::Supporting,
                authoritative: false,
            }],
            tiers: TierThresholds::default(),
            score_cap: DEFAULT_SCORE_CAP,
        };
        let err = TargetProfile::from_spec(spec).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_profile_from_json() {
        let json = r#"{
            "name": "minimal",
            "rules": [
                {"label": "kw", "field": "name", "pattern": "acme", "weight": 60}
            ]
        }"#;
        let profile = TargetProfile::from_json(json).unwrap();
        assert_eq!(profile.name(), "minimal");
        assert_eq!(profile.rules().len(), 1);
        assert_eq!(profile.tiers(), TierThresholds::default());
        assert_eq!(profile.score_cap(), DEFAULT_SCORE_CAP);
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = TargetProfile::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedProfile { .. }));
    }

    #[test]
    fn test_builtin_profile_compiles() {
        let profile = TargetProfile::china_affiliation();
        assert_eq!(profile.name(), "china_affiliation");
        assert!(profile.rules().len() >= 6);
    }

    #[test]
    fn test_profile_spec_round_trips() {
        let spec = ProfileSpec {
            name: "rt".to_string(),
            rules: vec![RuleSpec {
                label: "kw".to_string(),
                field: FieldKind::Description,
                pattern: "quantum".to_string(),
                weight: 40,
                polarity: Polarity::Supporting,
                authoritative: false,
            }],
            tiers: TierThresholds::default(),
            score_cap: 120,
        };
        let json = serde_json::to_string(&spec).unwrap();
        let back: ProfileSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
