//! Per-record feature table.
//!
//! Records are joined with the collector outputs on gene symbol. The
//! co-occurrence flag is computed per record before any aggregation.
//! Druggability score and network degree depend on which genes share a
//! partition, so they are attached per partition.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use stargazer_common::{AssociationRecord, DruggabilityTier, Source};

use crate::disease_provider::DiseaseScores;
use crate::druggability_provider::DruggabilityProvider;
use crate::partition::EffectTransform;
use crate::weights::Feature;

/// One association record with its evidence attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub gene: String,
    pub variant: String,
    pub phenotype: String,
    pub gwas_associations: String,
    pub source: Source,
    pub effect_size: f64,
    pub significance: f64,
    pub disease_association: f64,
    /// 1 when both the phenotype and a GWAS label name the disease
    pub co_occurrence: u8,
    pub druggability_tier: DruggabilityTier,
    pub druggability_score: u32,
    pub network_degree: u32,
}

impl FeatureRow {
    /// Raw value of a feature for this row.
    pub fn value(&self, feature: Feature, transform: EffectTransform) -> f64 {
        match feature {
            Feature::EffectSize         => transform.apply(self.effect_size),
            Feature::DiseaseAssociation => self.disease_association,
            Feature::CoOccurrence       => f64::from(self.co_occurrence),
            Feature::Druggability       => f64::from(self.druggability_score),
            Feature::NetworkDegree      => f64::from(self.network_degree),
        }
    }
}

/// Joins records with disease scores and druggability tiers.
pub struct FeatureAssembler<'a> {
    disease: &'a str,
    disease_scores: &'a DiseaseScores,
    druggability: &'a dyn DruggabilityProvider,
}

impl<'a> FeatureAssembler<'a> {
    pub fn new(
        disease: &'a str,
        disease_scores: &'a DiseaseScores,
        druggability: &'a dyn DruggabilityProvider,
    ) -> Self {
        Self { disease, disease_scores, druggability }
    }

    /// One row per record. Per-partition columns start at 0.
    pub fn assemble(&self, records: &[AssociationRecord]) -> Vec<FeatureRow> {
        records
            .iter()
            .map(|r| FeatureRow {
                gene: r.gene.clone(),
                variant: r.variant.clone(),
                phenotype: r.phenotype.clone(),
                gwas_associations: r.disease_tags.iter().cloned().collect::<Vec<_>>().join(", "),
                source: r.source,
                effect_size: r.effect_size,
                significance: r.significance,
                disease_association: self.disease_scores.get(&r.gene).copied().unwrap_or(0.0),
                co_occurrence: u8::from(r.co_occurs(self.disease)),
                druggability_tier: self.druggability.tier(&r.gene),
                druggability_score: 0,
                network_degree: 0,
            })
            .collect()
    }
}

/// Distinct genes in ascending symbol order.
pub fn distinct_genes(rows: &[FeatureRow]) -> Vec<String> {
    rows.iter()
        .map(|r| r.gene.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Number of distinct actionable tiers seen for each gene across `rows`.
pub fn druggability_scores(rows: &[FeatureRow]) -> HashMap<String, u32> {
    let mut tiers: HashMap<&str, BTreeSet<DruggabilityTier>> = HashMap::new();
    for row in rows.iter().filter(|r| r.druggability_tier.is_actionable()) {
        tiers.entry(row.gene.as_str()).or_default().insert(row.druggability_tier);
    }
    tiers
        .into_iter()
        .map(|(gene, set)| (gene.to_string(), set.len() as u32))
        .collect()
}

/// Fill the partition-scoped columns. Genes missing from `degrees` get 0.
pub fn attach_partition_evidence(rows: &mut [FeatureRow], degrees: &HashMap<String, u32>) {
    let scores = druggability_scores(rows);
    for row in rows.iter_mut() {
        row.druggability_score = scores.get(&row.gene).copied().unwrap_or(0);
        row.network_degree = degrees.get(&row.gene).copied().unwrap_or(0);
    }
}

/// Genes per tier, counting each (gene, tier) pair once.
pub fn tier_breakdown(rows: &[FeatureRow]) -> BTreeMap<DruggabilityTier, usize> {
    let pairs: BTreeSet<(&str, DruggabilityTier)> =
        rows.iter().map(|r| (r.gene.as_str(), r.druggability_tier)).collect();
    let mut counts = BTreeMap::new();
    for (_, tier) in pairs {
        *counts.entry(tier).or_insert(0) += 1;
    }
    counts
}
