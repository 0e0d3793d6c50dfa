/// Core entity types shared by the association store, the evidence
/// collectors and the ranker.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Odds ratio separating risk (>= 1) from protective (< 1) associations.
pub const NEUTRAL_EFFECT_SIZE: f64 = 1.0;

/// Gene symbol used for catalog rows without an annotated gene.
pub const UNKNOWN_GENE: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// Association record
// ---------------------------------------------------------------------------

/// Where an association record was loaded from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    PheWas,
    Gwas,
    Overlay,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PheWas  => "phewas",
            Source::Gwas    => "gwas",
            Source::Overlay => "overlay",
        }
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phewas"  => Ok(Source::PheWas),
            "gwas"    => Ok(Source::Gwas),
            "overlay" => Ok(Source::Overlay),
            other     => Err(format!("unknown association source '{other}'")),
        }
    }
}

/// One variant ↔ phenotype association.
/// `disease_tags` holds the GWAS-association labels of the variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssociationRecord {
    pub gene: String,
    pub variant: String,
    pub phenotype: String,
    pub disease_tags: BTreeSet<String>,
    /// Odds ratio, always > 0.
    pub effect_size: f64,
    /// p-value of the association.
    pub significance: f64,
    pub source: Source,
}

impl AssociationRecord {
    /// Phenotype field contains the tag.
    pub fn phenotype_matches(&self, tag: &str) -> bool {
        self.phenotype.contains(tag)
    }

    /// Any GWAS-association label contains the tag.
    pub fn tags_match(&self, tag: &str) -> bool {
        self.disease_tags.iter().any(|t| t.contains(tag))
    }

    /// Union match used by disease filtering.
    pub fn matches_disease(&self, tag: &str) -> bool {
        self.phenotype_matches(tag) || self.tags_match(tag)
    }

    /// Both the phenotype and the GWAS labels name the disease.
    pub fn co_occurs(&self, tag: &str) -> bool {
        self.phenotype_matches(tag) && self.tags_match(tag)
    }

    pub fn is_risk(&self) -> bool {
        self.effect_size >= NEUTRAL_EFFECT_SIZE
    }
}

// ---------------------------------------------------------------------------
// Druggability tier (Pharos target development level)
// ---------------------------------------------------------------------------

/// Ordered from least to most actionable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DruggabilityTier {
    #[default]
    None,
    Tdark,
    Tbio,
    Tchem,
    Tclin,
}

impl DruggabilityTier {
    pub const ALL: [DruggabilityTier; 5] = [
        DruggabilityTier::None,
        DruggabilityTier::Tdark,
        DruggabilityTier::Tbio,
        DruggabilityTier::Tchem,
        DruggabilityTier::Tclin,
    ];

    /// Tdark and None never count as druggability evidence.
    pub fn is_actionable(&self) -> bool {
        matches!(self, DruggabilityTier::Tbio | DruggabilityTier::Tchem | DruggabilityTier::Tclin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DruggabilityTier::None  => "None",
            DruggabilityTier::Tdark => "Tdark",
            DruggabilityTier::Tbio  => "Tbio",
            DruggabilityTier::Tchem => "Tchem",
            DruggabilityTier::Tclin => "Tclin",
        }
    }
}

impl fmt::Display for DruggabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DruggabilityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Tclin"       => Ok(DruggabilityTier::Tclin),
            "Tchem"       => Ok(DruggabilityTier::Tchem),
            "Tbio"        => Ok(DruggabilityTier::Tbio),
            "Tdark"       => Ok(DruggabilityTier::Tdark),
            "None" | ""   => Ok(DruggabilityTier::None),
            other         => Err(format!("unknown target development level '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Protein-protein interaction edge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionEdge {
    pub gene_a: String,
    pub gene_b: String,
    pub confidence: f64,
}

/// One over-represented functional term (GO, KEGG, ...) of a gene set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentTerm {
    /// Term namespace, e.g. `Process`, `Component`, `KEGG`
    pub category: String,
    pub term: String,
    pub description: String,
    /// False discovery rate
    pub fdr: f64,
    /// Input genes annotated with the term
    pub genes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Collector outcome
// ---------------------------------------------------------------------------

/// Result of asking an upstream evidence source for data.
/// `Unavailable` is never fatal; the consumer substitutes neutral evidence.
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence<T> {
    Available(T),
    Unavailable(String),
}

impl<T> Evidence<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Evidence::Unavailable(reason.into())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Evidence::Available(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Evidence<U> {
        match self {
            Evidence::Available(v)      => Evidence::Available(f(v)),
            Evidence::Unavailable(why)  => Evidence::Unavailable(why),
        }
    }

    /// Data if available, otherwise the supplied neutral value.
    pub fn or_neutral(self, neutral: T) -> T {
        match self {
            Evidence::Available(v)  => v,
            Evidence::Unavailable(_) => neutral,
        }
    }

    pub fn status(&self) -> SourceState {
        match self {
            Evidence::Available(_)     => SourceState::Available,
            Evidence::Unavailable(why) => SourceState::Unavailable { reason: why.clone() },
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for Evidence<T> {
    fn from(res: Result<T, E>) -> Self {
        match res {
            Ok(v)  => Evidence::Available(v),
            Err(e) => Evidence::Unavailable(e.to_string()),
        }
    }
}

/// Serializable availability of one collector for a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceState {
    Available,
    Unavailable { reason: String },
}

impl SourceState {
    pub fn is_available(&self) -> bool {
        matches!(self, SourceState::Available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(phenotype: &str, tags: &[&str], or: f64) -> AssociationRecord {
        AssociationRecord {
            gene: "IL13".to_string(),
            variant: "rs20541".to_string(),
            phenotype: phenotype.to_string(),
            disease_tags: tags.iter().map(|t| t.to_string()).collect(),
            effect_size: or,
            significance: 0.01,
            source: Source::PheWas,
        }
    }

    #[test]
    fn test_disease_match_is_substring_on_either_field() {
        let r = record("Asthma", &["Psoriasis"], 1.2);
        assert!(r.matches_disease("Asthma"));
        assert!(r.matches_disease("Psor"));
        assert!(!r.matches_disease("asthma"));
        assert!(!r.co_occurs("Asthma"));
    }

    #[test]
    fn test_co_occurrence_needs_both_fields() {
        let r = record("Asthma", &["Asthma", "Eczema"], 1.2);
        assert!(r.co_occurs("Asthma"));
        assert!(!r.co_occurs("Eczema"));
    }

    #[test]
    fn test_neutral_effect_size_is_risk() {
        assert!(record("Asthma", &[], 1.0).is_risk());
        assert!(!record("Asthma", &[], 0.99).is_risk());
    }

    #[test]
    fn test_tier_actionability() {
        assert!(DruggabilityTier::Tclin.is_actionable());
        assert!(DruggabilityTier::Tchem.is_actionable());
        assert!(DruggabilityTier::Tbio.is_actionable());
        assert!(!DruggabilityTier::Tdark.is_actionable());
        assert!(!DruggabilityTier::None.is_actionable());
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!("Tclin".parse::<DruggabilityTier>(), Ok(DruggabilityTier::Tclin));
        assert_eq!("".parse::<DruggabilityTier>(), Ok(DruggabilityTier::None));
        assert!("Tgold".parse::<DruggabilityTier>().is_err());
        assert!(DruggabilityTier::Tclin > DruggabilityTier::Tdark);
    }

    #[test]
    fn test_evidence_neutral_substitution() {
        let missing: Evidence<u32> = Evidence::unavailable("timeout");
        assert!(!missing.is_available());
        assert_eq!(missing.status(), SourceState::Unavailable { reason: "timeout".to_string() });
        assert_eq!(missing.or_neutral(0), 0);

        let ok: Evidence<u32> = Ok::<u32, String>(7).into();
        assert_eq!(ok.map(|v| v * 2).or_neutral(0), 14);
    }
}
