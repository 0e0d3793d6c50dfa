//! Trait for protein-protein interaction data, the degree computation and
//! functional enrichment of a gene set.

use std::collections::HashMap;

use tracing::{debug, warn};

use stargazer_common::{EnrichmentTerm, Evidence, InteractionEdge};
use stargazer_ingestion::sources::string_db::dedup_edges;
use stargazer_ingestion::sources::StringDbClient;

/// Trait for accessing interaction edges among a gene set.
pub trait InteractionProvider: Send + Sync {
    /// Edges whose endpoints were both requested.
    fn interactions(&self, genes: &[String]) -> Evidence<Vec<InteractionEdge>>;

    /// Terms over-represented in `genes`.
    fn enrichment(&self, genes: &[String]) -> Evidence<Vec<EnrichmentTerm>>;
}

/// Undirected degree of each queried gene: rows naming it as endpoint A plus
/// rows naming it as endpoint B. Every queried gene gets an entry.
pub fn degree_counts(genes: &[String], edges: &[InteractionEdge]) -> HashMap<String, u32> {
    let mut degrees: HashMap<String, u32> = genes.iter().map(|g| (g.clone(), 0)).collect();
    for edge in edges {
        if let Some(d) = degrees.get_mut(&edge.gene_a) {
            *d += 1;
        }
        if let Some(d) = degrees.get_mut(&edge.gene_b) {
            *d += 1;
        }
    }
    degrees
}

/// Fetch the network for `genes` and count degrees.
/// With `dedup`, exact-duplicate edge rows count once.
pub fn network_degrees(
    provider: &dyn InteractionProvider,
    genes: &[String],
    dedup: bool,
) -> Evidence<HashMap<String, u32>> {
    if genes.is_empty() {
        return Evidence::unavailable("empty gene set");
    }
    provider.interactions(genes).map(|edges| {
        let edges = if dedup { dedup_edges(edges) } else { edges };
        debug!(genes = genes.len(), edges = edges.len(), "Counting network degree");
        degree_counts(genes, &edges)
    })
}

/// Enrichment of `genes`, most significant term first.
pub fn enrichment_terms(provider: &dyn InteractionProvider, genes: &[String]) -> Evidence<Vec<EnrichmentTerm>> {
    if genes.is_empty() {
        return Evidence::unavailable("empty gene set");
    }
    provider.enrichment(genes).map(|mut terms| {
        terms.sort_by(|a, b| a.fdr.total_cmp(&b.fdr).then_with(|| a.term.cmp(&b.term)));
        debug!(genes = genes.len(), terms = terms.len(), "Enrichment collected");
        terms
    })
}

// ── Mock Implementation for Testing ────────────────────────────────────────

pub struct MockInteractionProvider {
    edges: Vec<InteractionEdge>,
    terms: Vec<EnrichmentTerm>,
    failure: Option<String>,
}

impl MockInteractionProvider {
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            terms: Vec::new(),
            failure: None,
        }
    }

    /// Add an edge row. Adding the same pair twice yields a parallel row.
    pub fn with(mut self, gene_a: &str, gene_b: &str, confidence: f64) -> Self {
        self.edges.push(InteractionEdge {
            gene_a: gene_a.to_string(),
            gene_b: gene_b.to_string(),
            confidence,
        });
        self
    }

    /// Add a term annotating `genes`. Queries see it restricted to the
    /// requested genes, and not at all when none of them were requested.
    pub fn with_term(mut self, term: &str, fdr: f64, genes: &[&str]) -> Self {
        self.terms.push(EnrichmentTerm {
            category: "Process".to_string(),
            term: term.to_string(),
            description: term.to_string(),
            fdr,
            genes: genes.iter().map(|g| g.to_string()).collect(),
        });
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }
}

impl Default for MockInteractionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionProvider for MockInteractionProvider {
    fn interactions(&self, genes: &[String]) -> Evidence<Vec<InteractionEdge>> {
        if let Some(reason) = &self.failure {
            return Evidence::unavailable(reason.clone());
        }
        Evidence::Available(
            self.edges
                .iter()
                .filter(|e| genes.contains(&e.gene_a) && genes.contains(&e.gene_b))
                .cloned()
                .collect(),
        )
    }

    fn enrichment(&self, genes: &[String]) -> Evidence<Vec<EnrichmentTerm>> {
        if let Some(reason) = &self.failure {
            return Evidence::unavailable(reason.clone());
        }
        Evidence::Available(
            self.terms
                .iter()
                .filter_map(|t| {
                    let hits: Vec<String> = t.genes.iter().filter(|g| genes.contains(g)).cloned().collect();
                    (!hits.is_empty()).then(|| EnrichmentTerm { genes: hits, ..t.clone() })
                })
                .collect(),
        )
    }
}

// ── Adapter for StringDbClient ─────────────────────────────────────────────

pub struct StringDbAdapter {
    client: StringDbClient,
}

impl StringDbAdapter {
    pub fn new(client: StringDbClient) -> Self {
        Self { client }
    }
}

impl InteractionProvider for StringDbAdapter {
    fn interactions(&self, genes: &[String]) -> Evidence<Vec<InteractionEdge>> {
        match self.client.network(genes) {
            Ok(edges) => Evidence::Available(edges),
            Err(e) => {
                warn!(genes = genes.len(), error = %e, "STRING unavailable");
                Evidence::unavailable(e.to_string())
            }
        }
    }

    fn enrichment(&self, genes: &[String]) -> Evidence<Vec<EnrichmentTerm>> {
        match self.client.enrichment(genes) {
            Ok(terms) => Evidence::Available(terms),
            Err(e) => {
                warn!(genes = genes.len(), error = %e, "STRING enrichment unavailable");
                Evidence::unavailable(e.to_string())
            }
        }
    }
}
