//! Per-partition gene scoring.
//!
//! The same routine runs for the overall, risk and protective partitions:
//! mean per gene, min-max per enabled feature, uniform weighted sum, sort.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::FeatureRow;
use crate::normalise::{minmax_column, nan_safe_mean};
use crate::partition::Partition;
use crate::weights::{Feature, FeatureSet};

/// Final score of one gene within one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneScore {
    pub gene: String,
    /// Rows that contributed
    pub variants: usize,
    /// Gene-level mean of every feature, before normalisation
    pub raw: BTreeMap<Feature, Option<f64>>,
    /// Normalised value of each enabled feature
    pub normalized: BTreeMap<Feature, Option<f64>>,
    pub aggregate_score: f64,
}

impl GeneScore {
    pub fn normalized_value(&self, feature: Feature) -> Option<f64> {
        self.normalized.get(&feature).copied().flatten()
    }
}

/// Scored genes of one partition plus the rows they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedTable {
    pub partition: Partition,
    pub features: Vec<Feature>,
    /// Sorted by aggregate score, descending
    pub genes: Vec<GeneScore>,
    /// Audit table
    pub rows: Vec<FeatureRow>,
}

impl RankedTable {
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn gene(&self, symbol: &str) -> Option<&GeneScore> {
        self.genes.iter().find(|g| g.gene == symbol)
    }

    pub fn top(&self, n: usize) -> &[GeneScore] {
        &self.genes[..n.min(self.genes.len())]
    }
}

/// Score one partition's rows.
pub fn score_partition(partition: Partition, rows: Vec<FeatureRow>, features: &FeatureSet) -> RankedTable {
    let transform = partition.transform();

    let mut groups: BTreeMap<&str, Vec<&FeatureRow>> = BTreeMap::new();
    for row in &rows {
        groups.entry(row.gene.as_str()).or_default().push(row);
    }

    let mut genes: Vec<GeneScore> = groups
        .iter()
        .map(|(gene, members)| GeneScore {
            gene: gene.to_string(),
            variants: members.len(),
            raw: Feature::ALL
                .into_iter()
                .map(|f| (f, nan_safe_mean(members.iter().map(|r| r.value(f, transform)))))
                .collect(),
            normalized: BTreeMap::new(),
            aggregate_score: 0.0,
        })
        .collect();

    for feature in features.iter() {
        let column: Vec<Option<f64>> = genes
            .iter()
            .map(|g| g.raw.get(&feature).copied().flatten())
            .collect();
        for (gene, value) in genes.iter_mut().zip(minmax_column(&column)) {
            gene.normalized.insert(feature, value);
        }
    }

    let weights = features.weights();
    for gene in genes.iter_mut() {
        gene.aggregate_score = weights
            .iter()
            .map(|(f, w)| w * gene.normalized_value(*f).unwrap_or(0.0))
            .sum();
    }

    // stable: equal scores keep ascending symbol order
    genes.sort_by(|a, b| {
        b.aggregate_score
            .partial_cmp(&a.aggregate_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(partition = %partition, genes = genes.len(), rows = rows.len(), "Partition scored");

    RankedTable {
        partition,
        features: features.iter().collect(),
        genes,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::row;
    use stargazer_test_utils::assert_close;

    fn rows() -> Vec<FeatureRow> {
        vec![
            FeatureRow { disease_association: 0.9, network_degree: 2, ..row("IL13", 1.5) },
            FeatureRow { disease_association: 0.9, network_degree: 2, ..row("IL13", 2.5) },
            FeatureRow { disease_association: 0.1, co_occurrence: 1, ..row("ORMDL3", 1.2) },
            FeatureRow { disease_association: 0.5, network_degree: 4, ..row("GSDMB", 1.0) },
        ]
    }

    #[test]
    fn test_gene_means_and_bounds() {
        let table = score_partition(Partition::Risk, rows(), &FeatureSet::default());
        let il13 = table.gene("IL13").unwrap();
        assert_eq!(il13.variants, 2);
        assert_close(il13.raw[&Feature::EffectSize].unwrap(), 2.0);

        for feature in table.features.iter() {
            let values: Vec<f64> = table.genes.iter().filter_map(|g| g.normalized_value(*feature)).collect();
            assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
        }
        assert_close(il13.normalized_value(Feature::EffectSize).unwrap(), 1.0);
        assert_close(table.gene("GSDMB").unwrap().normalized_value(Feature::EffectSize).unwrap(), 0.0);
    }

    #[test]
    fn test_sorted_descending() {
        let table = score_partition(Partition::Risk, rows(), &FeatureSet::default());
        let scores: Vec<f64> = table.genes.iter().map(|g| g.aggregate_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_single_feature_equals_that_feature() {
        let only = FeatureSet::new([Feature::DiseaseAssociation]).unwrap();
        let table = score_partition(Partition::Overall, rows(), &only);
        for g in &table.genes {
            assert_close(g.aggregate_score, g.normalized_value(Feature::DiseaseAssociation).unwrap());
        }
        assert_eq!(table.genes[0].gene, "IL13");
    }

    #[test]
    fn test_aggregate_is_weighted_sum_of_enabled() {
        let set = FeatureSet::default().without(Feature::CoOccurrence).unwrap();
        let table = score_partition(Partition::Risk, rows(), &set);
        let il13 = table.gene("IL13").unwrap();
        assert!(il13.normalized_value(Feature::CoOccurrence).is_none());
        // 0.25 * (effect 1.0 + disease 1.0 + druggability 0.0 + degree 0.5)
        assert_close(il13.aggregate_score, 0.625);
    }

    #[test]
    fn test_ties_keep_symbol_order() {
        let tied = vec![row("ZNF1", 1.5), row("ABCA1", 1.5), row("MYC", 1.5)];
        let table = score_partition(Partition::Risk, tied, &FeatureSet::default());
        let order: Vec<&str> = table.genes.iter().map(|g| g.gene.as_str()).collect();
        assert_eq!(order, vec!["ABCA1", "MYC", "ZNF1"]);
    }

    #[test]
    fn test_empty_partition() {
        let table = score_partition(Partition::Protective, vec![], &FeatureSet::default());
        assert!(table.is_empty());
        assert!(table.top(5).is_empty());
    }

    #[test]
    fn test_protective_uses_complement() {
        let table = score_partition(Partition::Protective, vec![row("TSLP", 0.4), row("GSDMB", 0.8)], &FeatureSet::default());
        assert_close(table.gene("TSLP").unwrap().raw[&Feature::EffectSize].unwrap(), 0.6);
        assert_eq!(table.genes[0].gene, "TSLP");
    }
}
