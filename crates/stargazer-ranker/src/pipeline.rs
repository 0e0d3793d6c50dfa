//! Prioritization query runner.
//!
//! store filter → disease scores → feature rows → per partition:
//! druggability score + network degree → score → report.
//! `study` and `network` give the unscored views, with functional enrichment.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use stargazer_common::{DruggabilityTier, EnrichmentTerm, Evidence, SourceState};
use stargazer_ingestion::{disease_query_name, AssociationStore, PValueThreshold, StudyScope};

use crate::disease_provider::{DiseaseAssociationProvider, DiseaseScores};
use crate::druggability_provider::DruggabilityProvider;
use crate::features::{attach_partition_evidence, distinct_genes, tier_breakdown, FeatureAssembler, FeatureRow};
use crate::interaction_provider::{enrichment_terms, network_degrees, InteractionProvider};
use crate::partition::Partition;
use crate::scorer::{score_partition, RankedTable};
use crate::weights::{Feature, FeatureSet};

/// Inputs of one prioritization run.
#[derive(Debug, Clone)]
pub struct PrioritizationQuery {
    /// Disease label; a trailing " (...)" qualifier is ignored
    pub disease: String,
    pub threshold: PValueThreshold,
    pub scope: StudyScope,
    pub features: FeatureSet,
    pub dedup_interactions: bool,
}

impl PrioritizationQuery {
    pub fn new(disease: impl Into<String>) -> Self {
        Self {
            disease: disease.into(),
            threshold: PValueThreshold::default(),
            scope: StudyScope::Union,
            features: FeatureSet::default(),
            dedup_interactions: true,
        }
    }

    pub fn with_threshold(mut self, threshold: PValueThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_scope(mut self, scope: StudyScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup_interactions = dedup;
        self
    }

    /// Name used for matching and for the disease-association lookup.
    pub fn query_name(&self) -> &str {
        disease_query_name(&self.disease)
    }
}

/// Availability of each collector during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub disease_association: SourceState,
    pub druggability: SourceState,
    /// Queried once per partition gene set
    pub network: BTreeMap<Partition, SourceState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizationReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub disease: String,
    pub threshold: PValueThreshold,
    pub scope: StudyScope,
    pub features: Vec<Feature>,
    pub sources: SourceStatus,
    pub overall: RankedTable,
    pub risk: RankedTable,
    pub protective: RankedTable,
    /// Genes per druggability tier, per partition
    pub tiers: BTreeMap<Partition, BTreeMap<DruggabilityTier, usize>>,
}

impl PrioritizationReport {
    pub fn table(&self, partition: Partition) -> &RankedTable {
        match partition {
            Partition::Overall    => &self.overall,
            Partition::Risk       => &self.risk,
            Partition::Protective => &self.protective,
        }
    }

    pub fn tables(&self) -> [&RankedTable; 3] {
        [&self.overall, &self.risk, &self.protective]
    }
}

#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Ranked(Box<PrioritizationReport>),
    /// Nothing matched the disease at this threshold
    NoData { disease: String, threshold: PValueThreshold },
}

/// Filtered records of one disease with tiers attached, split by direction.
#[derive(Debug, Clone)]
pub struct StudyView {
    pub rows: Vec<FeatureRow>,
    pub tiers: BTreeMap<Partition, BTreeMap<DruggabilityTier, usize>>,
}

impl StudyView {
    pub fn partition(&self, partition: Partition) -> Vec<FeatureRow> {
        partition.select(&self.rows)
    }

    /// Distinct genes with a recorded target development level.
    pub fn druggable_genes(&self) -> Vec<String> {
        let rows: Vec<FeatureRow> = self
            .rows
            .iter()
            .filter(|r| r.druggability_tier != DruggabilityTier::None)
            .cloned()
            .collect();
        distinct_genes(&rows)
    }
}

/// Interaction degree and enrichment of one partition's gene set.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionNetwork {
    pub degrees: Evidence<HashMap<String, u32>>,
    pub enrichment: Evidence<Vec<EnrichmentTerm>>,
}

/// Runs queries against one store and one set of providers.
pub struct Prioritizer<'a> {
    store: &'a AssociationStore,
    diseases: &'a dyn DiseaseAssociationProvider,
    interactions: &'a dyn InteractionProvider,
    druggability: &'a dyn DruggabilityProvider,
}

impl<'a> Prioritizer<'a> {
    pub fn new(
        store: &'a AssociationStore,
        diseases: &'a dyn DiseaseAssociationProvider,
        interactions: &'a dyn InteractionProvider,
        druggability: &'a dyn DruggabilityProvider,
    ) -> Self {
        Self { store, diseases, interactions, druggability }
    }

    #[instrument(skip(self), fields(disease = %query.disease, threshold = %query.threshold))]
    pub fn run(&self, query: &PrioritizationQuery) -> QueryOutcome {
        let tag = query.query_name();
        let records = self.store.select(tag, query.scope, query.threshold);
        if records.is_empty() {
            info!("No associations match this disease and threshold");
            return QueryOutcome::NoData {
                disease: query.disease.clone(),
                threshold: query.threshold,
            };
        }

        let disease_evidence = self.diseases.gene_scores(tag);
        let disease_state = disease_evidence.status();
        if !disease_state.is_available() {
            warn!("Disease association scores unavailable, using 0 for every gene");
        }
        let scores = disease_evidence.or_neutral(DiseaseScores::new());

        let base = FeatureAssembler::new(tag, &scores, self.druggability).assemble(&records);

        let mut network = BTreeMap::new();
        let mut tiers = BTreeMap::new();
        let mut tables = BTreeMap::new();
        for partition in Partition::ALL {
            let mut rows = partition.select(&base);
            let genes = distinct_genes(&rows);
            let degrees = network_degrees(self.interactions, &genes, query.dedup_interactions);
            if !degrees.is_available() && !genes.is_empty() {
                warn!(partition = %partition, "Network degree unavailable, using 0 for every gene");
            }
            network.insert(partition, degrees.status());

            attach_partition_evidence(&mut rows, &degrees.or_neutral(HashMap::new()));
            tiers.insert(partition, tier_breakdown(&rows));
            tables.insert(partition, score_partition(partition, rows, &query.features));
        }

        let mut take = |p: Partition| {
            tables
                .remove(&p)
                .unwrap_or_else(|| score_partition(p, Vec::new(), &query.features))
        };
        let (overall, risk, protective) = (take(Partition::Overall), take(Partition::Risk), take(Partition::Protective));

        info!(
            genes = overall.genes.len(),
            risk = risk.genes.len(),
            protective = protective.genes.len(),
            "Prioritization complete"
        );

        QueryOutcome::Ranked(Box::new(PrioritizationReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            disease: tag.to_string(),
            threshold: query.threshold,
            scope: query.scope,
            features: query.features.iter().collect(),
            sources: SourceStatus {
                disease_association: disease_state,
                druggability: self.druggability.status(),
                network,
            },
            overall,
            risk,
            protective,
            tiers,
        }))
    }

    /// Records of one disease with druggability tiers, without scoring.
    /// `None` when nothing matches.
    pub fn study(&self, disease: &str, scope: StudyScope, threshold: PValueThreshold) -> Option<StudyView> {
        let tag = disease_query_name(disease);
        let records = self.store.select(tag, scope, threshold);
        if records.is_empty() {
            return None;
        }
        let no_scores = DiseaseScores::new();
        let rows = FeatureAssembler::new(tag, &no_scores, self.druggability).assemble(&records);
        let tiers = Partition::ALL
            .into_iter()
            .map(|p| (p, tier_breakdown(&p.select(&rows))))
            .collect();
        Some(StudyView { rows, tiers })
    }

    /// Network degree and enrichment of each partition's gene set. `None`
    /// when nothing matches.
    pub fn network(
        &self,
        disease: &str,
        scope: StudyScope,
        threshold: PValueThreshold,
        dedup: bool,
    ) -> Option<BTreeMap<Partition, PartitionNetwork>> {
        let view = self.study(disease, scope, threshold)?;
        Some(
            Partition::ALL
                .into_iter()
                .map(|p| {
                    let genes = distinct_genes(&view.partition(p));
                    let net = PartitionNetwork {
                        degrees: network_degrees(self.interactions, &genes, dedup),
                        enrichment: enrichment_terms(self.interactions, &genes),
                    };
                    (p, net)
                })
                .collect(),
        )
    }

    /// Enrichment of an arbitrary gene set, most significant term first.
    pub fn enrichment(&self, genes: &[String]) -> Evidence<Vec<EnrichmentTerm>> {
        let terms = enrichment_terms(self.interactions, genes);
        if !terms.is_available() && !genes.is_empty() {
            warn!(genes = genes.len(), "Enrichment unavailable");
        }
        terms
    }
}
