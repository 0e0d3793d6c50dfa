//! Provider used when upstream services are switched off.

use std::collections::HashMap;

use stargazer_common::{EnrichmentTerm, Evidence, InteractionEdge};

use crate::disease_provider::DiseaseAssociationProvider;
use crate::interaction_provider::InteractionProvider;

const OFFLINE: &str = "offline";

/// Answers every request with `Unavailable("offline")`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProvider;

impl DiseaseAssociationProvider for OfflineProvider {
    fn gene_scores(&self, _disease: &str) -> Evidence<HashMap<String, f64>> {
        Evidence::unavailable(OFFLINE)
    }
}

impl InteractionProvider for OfflineProvider {
    fn interactions(&self, _genes: &[String]) -> Evidence<Vec<InteractionEdge>> {
        Evidence::unavailable(OFFLINE)
    }

    fn enrichment(&self, _genes: &[String]) -> Evidence<Vec<EnrichmentTerm>> {
        Evidence::unavailable(OFFLINE)
    }
}
