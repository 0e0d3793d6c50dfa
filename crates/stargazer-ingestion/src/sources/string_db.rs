//! STRING protein-protein interaction client.
//! Fetches the interaction network among a set of gene symbols, and the
//! functional enrichment of the set, as TSV.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, instrument};

use stargazer_common::sandbox::SandboxClient;
use stargazer_common::{EnrichmentTerm, InteractionEdge, Result, StargazerError};

/// Human
pub const DEFAULT_SPECIES: u32 = 9606;

pub struct StringDbClient {
    client: SandboxClient,
    base_url: String,
    species: u32,
    caller_identity: String,
}

#[derive(Debug, Deserialize)]
struct NetworkRow {
    #[serde(rename = "preferredName_A")]
    name_a: String,
    #[serde(rename = "preferredName_B")]
    name_b: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct EnrichmentRow {
    category: String,
    term: String,
    #[serde(rename = "preferredNames")]
    preferred_names: String,
    fdr: f64,
    description: String,
}

impl StringDbClient {
    pub fn new(
        client: SandboxClient,
        base_url: impl Into<String>,
        species: u32,
        caller_identity: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            species,
            caller_identity: caller_identity.into(),
        }
    }

    /// Interaction edges among `genes`. Rows are returned as STRING sends them.
    #[instrument(skip(self, genes), fields(genes = genes.len()))]
    pub fn network(&self, genes: &[String]) -> Result<Vec<InteractionEdge>> {
        let body = self.post_identifiers("network", genes)?;
        let edges = parse_network_tsv(&body)?;
        debug!(edges = edges.len(), "STRING network fetched");
        Ok(edges)
    }

    /// Functional enrichment of `genes` against the species background.
    #[instrument(skip(self, genes), fields(genes = genes.len()))]
    pub fn enrichment(&self, genes: &[String]) -> Result<Vec<EnrichmentTerm>> {
        let body = self.post_identifiers("enrichment", genes)?;
        let terms = parse_enrichment_tsv(&body)?;
        debug!(terms = terms.len(), "STRING enrichment fetched");
        Ok(terms)
    }

    /// POST `{base}/tsv/{method}` with the identifiers joined by `\r`.
    fn post_identifiers(&self, method: &str, genes: &[String]) -> Result<String> {
        let url = format!("{}/tsv/{}", self.base_url.trim_end_matches('/'), method);
        let identifiers = genes.join("\r");
        let species = self.species.to_string();

        let body = self.client
            .post(&url)?
            .form(&[
                ("identifiers", identifiers.as_str()),
                ("species", species.as_str()),
                ("caller_identity", self.caller_identity.as_str()),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }
}

/// Parse the `tsv/network` payload. An empty body is an empty network.
pub fn parse_network_tsv(body: &str) -> Result<Vec<InteractionEdge>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(body.as_bytes());

    let mut edges = Vec::new();
    for result in reader.deserialize::<NetworkRow>() {
        let row = result.map_err(|e| StargazerError::Upstream(format!("STRING network TSV: {}", e)))?;
        edges.push(InteractionEdge {
            gene_a: row.name_a,
            gene_b: row.name_b,
            confidence: row.score,
        });
    }
    Ok(edges)
}

/// Parse the `tsv/enrichment` payload. An empty body means no term passed
/// STRING's cut-off.
pub fn parse_enrichment_tsv(body: &str) -> Result<Vec<EnrichmentTerm>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(body.as_bytes());

    let mut terms = Vec::new();
    for result in reader.deserialize::<EnrichmentRow>() {
        let row = result.map_err(|e| StargazerError::Upstream(format!("STRING enrichment TSV: {}", e)))?;
        terms.push(EnrichmentTerm {
            category: row.category,
            term: row.term,
            description: row.description,
            fdr: row.fdr,
            genes: row
                .preferred_names
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(String::from)
                .collect(),
        });
    }
    Ok(terms)
}

/// Removes exact-duplicate rows, keeping the first occurrence.
pub fn dedup_edges(edges: Vec<InteractionEdge>) -> Vec<InteractionEdge> {
    let mut seen: HashSet<(String, String, u64)> = HashSet::with_capacity(edges.len());
    edges
        .into_iter()
        .filter(|e| seen.insert((e.gene_a.clone(), e.gene_b.clone(), e.confidence.to_bits())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETWORK: &str = "stringId_A\tstringId_B\tpreferredName_A\tpreferredName_B\tncbiTaxonId\tscore\tnscore\n\
9606.ENSP00000304915\t9606.ENSP00000389794\tIL13\tIL4R\t9606\t0.999\t0\n\
9606.ENSP00000304915\t9606.ENSP00000389794\tIL13\tIL4R\t9606\t0.999\t0\n\
9606.ENSP00000389794\t9606.ENSP00000231449\tIL4R\tIL4\t9606\t0.98\t0\n";

    #[test]
    fn test_parse_network_tsv() {
        let edges = parse_network_tsv(NETWORK).unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].gene_a, "IL13");
        assert_eq!(edges[0].gene_b, "IL4R");
        assert!((edges[2].confidence - 0.98).abs() < 1e-12);
    }

    #[test]
    fn test_parse_empty_network() {
        assert!(parse_network_tsv("").unwrap().is_empty());
        let header_only = "stringId_A\tstringId_B\tpreferredName_A\tpreferredName_B\tncbiTaxonId\tscore\n";
        assert!(parse_network_tsv(header_only).unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_payload() {
        let err = parse_network_tsv("Error\tErrorMessage\nnot found\tno identifiers\n").unwrap_err();
        assert!(matches!(err, StargazerError::Upstream(_)));
    }

    const ENRICHMENT: &str = "category\tterm\tnumber_of_genes\tnumber_of_genes_in_background\tncbiTaxonId\tinputGenes\tpreferredNames\tp_value\tfdr\tdescription\n\
Process\tGO:0002696\t3\t545\t9606\t9606.ENSP00000304915,9606.ENSP00000389794,9606.ENSP00000231449\tIL13,IL4R,IL4\t1.1e-06\t0.0042\tPositive regulation of leukocyte activation\n\
KEGG\thsa04060\t2\t291\t9606\t9606.ENSP00000304915,9606.ENSP00000231449\tIL13,IL4\t2.3e-04\t0.031\tCytokine-cytokine receptor interaction\n";

    #[test]
    fn test_parse_enrichment_tsv() {
        let terms = parse_enrichment_tsv(ENRICHMENT).unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].category, "Process");
        assert_eq!(terms[0].term, "GO:0002696");
        assert_eq!(terms[0].description, "Positive regulation of leukocyte activation");
        assert_eq!(terms[0].genes, vec!["IL13", "IL4R", "IL4"]);
        assert!((terms[1].fdr - 0.031).abs() < 1e-12);
        assert_eq!(terms[1].genes, vec!["IL13", "IL4"]);
    }

    #[test]
    fn test_parse_enrichment_empty_and_error() {
        assert!(parse_enrichment_tsv("\n").unwrap().is_empty());
        let err = parse_enrichment_tsv("Error\tErrorMessage\nnot found\tno identifiers\n").unwrap_err();
        assert!(matches!(err, StargazerError::Upstream(_)));
    }

    #[test]
    fn test_enrichment_outside_allowlist_fails() {
        let client = StringDbClient::new(SandboxClient::new().unwrap(), "https://string.example.invalid/api", DEFAULT_SPECIES, "stargazer");
        let err = client.enrichment(&["IL13".to_string()]).unwrap_err();
        assert!(matches!(err, StargazerError::Security(_)));
    }

    #[test]
    fn test_dedup_large_network() {
        let mut edges = Vec::new();
        for i in 0..20_000 {
            edges.push(InteractionEdge { gene_a: format!("G{}", i % 5_000), gene_b: "HUB".into(), confidence: 0.9 });
        }
        let kept = dedup_edges(edges);
        assert_eq!(kept.len(), 5_000);
        assert_eq!(kept[0].gene_a, "G0");
        assert_eq!(kept[4_999].gene_a, "G4999");
    }

    #[test]
    fn test_dedup_edges_keeps_first() {
        let edges = dedup_edges(parse_network_tsv(NETWORK).unwrap());
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[1].gene_b, "IL4");
    }
}
