//! Trait for gene ↔ disease association scores.

use std::collections::HashMap;

use tracing::{debug, warn};

use stargazer_common::Evidence;
use stargazer_ingestion::sources::OpenTargetsClient;

/// Gene symbol → association score for one disease.
pub type DiseaseScores = HashMap<String, f64>;

/// Trait for accessing disease-association evidence.
pub trait DiseaseAssociationProvider: Send + Sync {
    /// Scores for the best-matching disease. `Unavailable` when the name does
    /// not resolve or the service fails.
    fn gene_scores(&self, disease: &str) -> Evidence<DiseaseScores>;
}

// ── Mock Implementation for Testing ────────────────────────────────────────

pub struct MockDiseaseAssociationProvider {
    data: HashMap<String, DiseaseScores>,
    failure: Option<String>,
}

impl MockDiseaseAssociationProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            failure: None,
        }
    }

    /// Disease names are matched case-insensitively.
    pub fn with(mut self, disease: &str, gene: &str, score: f64) -> Self {
        self.data
            .entry(disease.to_lowercase())
            .or_default()
            .insert(gene.to_string(), score);
        self
    }

    /// Every lookup returns `Unavailable(reason)`.
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }
}

impl Default for MockDiseaseAssociationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DiseaseAssociationProvider for MockDiseaseAssociationProvider {
    fn gene_scores(&self, disease: &str) -> Evidence<DiseaseScores> {
        if let Some(reason) = &self.failure {
            return Evidence::unavailable(reason.clone());
        }
        match self.data.get(&disease.to_lowercase()) {
            Some(scores) => Evidence::Available(scores.clone()),
            None => Evidence::unavailable("no matching disease"),
        }
    }
}

// ── Adapter for OpenTargetsClient ──────────────────────────────────────────

pub struct OpenTargetsAdapter {
    client: OpenTargetsClient,
}

impl OpenTargetsAdapter {
    pub fn new(client: OpenTargetsClient) -> Self {
        Self { client }
    }
}

impl DiseaseAssociationProvider for OpenTargetsAdapter {
    fn gene_scores(&self, disease: &str) -> Evidence<DiseaseScores> {
        match self.client.gene_scores(disease) {
            Ok(Some(rows)) => {
                let mut scores = DiseaseScores::with_capacity(rows.len());
                for row in rows {
                    scores.entry(row.gene_symbol).or_insert(row.score);
                }
                debug!(disease, genes = scores.len(), "Disease association scores collected");
                Evidence::Available(scores)
            }
            Ok(None) => {
                warn!(disease, "No OpenTargets disease matches this name");
                Evidence::unavailable("no matching disease")
            }
            Err(e) => {
                warn!(disease, error = %e, "OpenTargets unavailable");
                Evidence::unavailable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stargazer_common::sandbox::SandboxClient;

    #[test]
    fn test_mock_matches_case_insensitively() {
        let provider = MockDiseaseAssociationProvider::new()
            .with("Asthma", "IL13", 0.8)
            .with("Asthma", "ORMDL3", 0.6);

        let scores = provider.gene_scores("asthma").or_neutral(DiseaseScores::new());
        assert_eq!(scores.len(), 2);
        assert_eq!(scores.get("IL13"), Some(&0.8));
    }

    #[test]
    fn test_mock_unknown_disease_unavailable() {
        let provider = MockDiseaseAssociationProvider::new().with("Asthma", "IL13", 0.8);
        assert!(!provider.gene_scores("Psoriasis").is_available());
    }

    #[test]
    fn test_mock_failing() {
        let provider = MockDiseaseAssociationProvider::new()
            .with("Asthma", "IL13", 0.8)
            .failing("timeout");
        assert_eq!(provider.gene_scores("Asthma"), Evidence::unavailable("timeout"));
    }

    #[test]
    fn test_adapter_source_error_is_unavailable() {
        let client = OpenTargetsClient::new(
            SandboxClient::new().unwrap(),
            "https://opentargets.example.invalid/api/v4/graphql",
        );
        let adapter = OpenTargetsAdapter::new(client);
        match adapter.gene_scores("Asthma") {
            Evidence::Unavailable(reason) => assert!(reason.contains("allowlist"), "reason: {reason}"),
            Evidence::Available(_) => panic!("expected unavailable"),
        }
    }
}
