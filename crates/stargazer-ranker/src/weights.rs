//! Feature selection and the uniform weight vector.
//!
//! Every enabled feature gets weight 1/|enabled|, so toggling a feature
//! re-weights all the others.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use stargazer_common::{Result, StargazerError};

/// The five per-gene evidence features, in report column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Odds ratio; `1 - OR` in the protective partition
    EffectSize,
    /// OpenTargets gene ↔ disease score
    DiseaseAssociation,
    /// Disease named in both the phenotype and the GWAS labels
    CoOccurrence,
    /// Distinct actionable Pharos tiers
    Druggability,
    /// STRING degree within the partition's gene set
    NetworkDegree,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::EffectSize,
        Feature::DiseaseAssociation,
        Feature::CoOccurrence,
        Feature::Druggability,
        Feature::NetworkDegree,
    ];

    /// Config and CLI key.
    pub fn key(&self) -> &'static str {
        match self {
            Feature::EffectSize         => "effect_size",
            Feature::DiseaseAssociation => "disease_association",
            Feature::CoOccurrence       => "co_occurrence",
            Feature::Druggability       => "druggability",
            Feature::NetworkDegree      => "network_degree",
        }
    }

    /// Human-readable column header.
    pub fn label(&self) -> &'static str {
        match self {
            Feature::EffectSize         => "odds ratio",
            Feature::DiseaseAssociation => "OpenTargets association",
            Feature::CoOccurrence       => "PheWAS/GWAS co-occurrence",
            Feature::Druggability       => "druggability",
            Feature::NetworkDegree      => "network degree",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Feature {
    type Err = StargazerError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Feature::ALL
            .into_iter()
            .find(|f| f.key() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Feature::ALL.iter().map(Feature::key).collect();
                StargazerError::Config(format!("unknown feature '{}' (expected one of {})", s, known.join(", ")))
            })
    }
}

/// The set of features that contribute to the aggregate score.
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    enabled: BTreeSet<Feature>,
}

impl Default for FeatureSet {
    /// All five features.
    fn default() -> Self {
        Self { enabled: Feature::ALL.into_iter().collect() }
    }
}

impl FeatureSet {
    pub fn new<I: IntoIterator<Item = Feature>>(features: I) -> Result<Self> {
        let enabled: BTreeSet<Feature> = features.into_iter().collect();
        if enabled.is_empty() {
            return Err(StargazerError::Config("at least one feature must stay enabled".to_string()));
        }
        Ok(Self { enabled })
    }

    /// Default set minus the given keys.
    pub fn from_disabled<S: AsRef<str>>(disabled: &[S]) -> Result<Self> {
        let mut removed = BTreeSet::new();
        for key in disabled {
            removed.insert(key.as_ref().parse::<Feature>()?);
        }
        Self::new(Feature::ALL.into_iter().filter(|f| !removed.contains(f)))
    }

    pub fn without(&self, feature: Feature) -> Result<Self> {
        Self::new(self.enabled.iter().copied().filter(|f| *f != feature))
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.enabled.contains(&feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.enabled.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Weight of each enabled feature.
    pub fn weight(&self) -> f64 {
        1.0 / self.enabled.len() as f64
    }

    /// (feature, weight) pairs; disabled features carry weight 0.
    pub fn weights(&self) -> [(Feature, f64); 5] {
        let w = self.weight();
        Feature::ALL.map(|f| (f, if self.contains(f) { w } else { 0.0 }))
    }
}
