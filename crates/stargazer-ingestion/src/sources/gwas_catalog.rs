//! GWAS catalog REST client for single-trait overlays.
//!
//! Endpoint: https://www.ebi.ac.uk/gwas/rest/api/efoTraits/{id}/associations

use std::collections::{BTreeSet, HashSet};

use serde_json::Value;
use tracing::{debug, info, instrument};

use stargazer_common::config::OverlaySpec;
use stargazer_common::entities::UNKNOWN_GENE;
use stargazer_common::sandbox::SandboxClient;
use stargazer_common::{AssociationRecord, Result, Source, StargazerError};

const SNP_LINK_MARKER: &str = "Polymorphisms/";

pub struct GwasCatalogClient {
    client: SandboxClient,
    base_url: String,
}

impl GwasCatalogClient {
    pub fn new(client: SandboxClient, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    /// Association records for one trait, labelled with the overlay label.
    #[instrument(skip(self), fields(efo_id = %overlay.efo_id))]
    pub fn trait_associations(&self, overlay: &OverlaySpec) -> Result<Vec<AssociationRecord>> {
        let url = format!(
            "{}/efoTraits/{}/associations?projection=associationByEfoTrait",
            self.base_url.trim_end_matches('/'),
            overlay.efo_id
        );
        let body: Value = self.client.get(&url)?.send()?.error_for_status()?.json()?;
        let records = parse_trait_associations(&body, &overlay.label)?;
        info!(label = %overlay.label, records = records.len(), "GWAS catalog overlay fetched");
        Ok(records)
    }
}

/// `.../singleNucleotidePolymorphisms/rs123{?projection}` → `rs123`
pub fn variant_from_snp_link(href: &str) -> Option<String> {
    let tail = href.split(SNP_LINK_MARKER).nth(1)?;
    let id = tail.split('{').next().unwrap_or(tail).trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Flattens `_embedded.associations[] → snps[] → genomicContexts[]` into one
/// record per genomic-context gene. Associations without `orPerCopyNum` are
/// dropped and exact duplicates removed.
pub fn parse_trait_associations(body: &Value, label: &str) -> Result<Vec<AssociationRecord>> {
    let associations = body["_embedded"]["associations"]
        .as_array()
        .ok_or_else(|| StargazerError::Upstream("GWAS catalog: missing _embedded.associations".to_string()))?;

    let tags: BTreeSet<String> = [label.to_string()].into_iter().collect();
    let mut records: Vec<AssociationRecord> = Vec::new();
    // label and source are fixed per overlay
    let mut seen: HashSet<(String, String, u64, u64)> = HashSet::new();
    let mut dropped = 0usize;

    for assoc in associations {
        let effect_size = match numeric(&assoc["orPerCopyNum"]) {
            Some(or) if or.is_finite() && or > 0.0 => or,
            _ => {
                dropped += 1;
                continue;
            }
        };
        let Some(significance) = numeric(&assoc["pvalue"]) else {
            dropped += 1;
            continue;
        };

        for snp in assoc["snps"].as_array().into_iter().flatten() {
            let variant = snp["_links"]["snp"]["href"]
                .as_str()
                .and_then(variant_from_snp_link)
                .unwrap_or_default();

            for context in snp["genomicContexts"].as_array().into_iter().flatten() {
                let gene = context["gene"]["geneName"]
                    .as_str()
                    .filter(|g| !g.is_empty())
                    .unwrap_or(UNKNOWN_GENE)
                    .to_string();

                let key = (gene.clone(), variant.clone(), effect_size.to_bits(), significance.to_bits());
                if !seen.insert(key) {
                    continue;
                }
                records.push(AssociationRecord {
                    gene,
                    variant: variant.clone(),
                    phenotype: label.to_string(),
                    disease_tags: tags.clone(),
                    effect_size,
                    significance,
                    source: Source::Overlay,
                });
            }
        }
    }

    debug!(label, kept = records.len(), dropped, "Parsed GWAS catalog associations");
    Ok(records)
}

/// The API serialises some numbers as strings.
fn numeric(v: &Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> Value {
        let snp = |rs: &str, genes: &[&str]| {
            json!({
                "_links": { "snp": { "href": format!("https://www.ebi.ac.uk/gwas/rest/api/singleNucleotidePolymorphisms/{rs}{{?projection}}") } },
                "genomicContexts": genes.iter().map(|g| json!({ "gene": { "geneName": g } })).collect::<Vec<_>>()
            })
        };
        json!({ "_embedded": { "associations": [
            { "orPerCopyNum": 1.6, "pvalue": 1e-12, "snps": [snp("rs10490770", &["LZTFL1", "LZTFL1", "SLC6A20"])] },
            { "orPerCopyNum": null, "pvalue": 1e-9, "snps": [snp("rs657152", &["ABO"])] },
            { "orPerCopyNum": "0.78", "pvalue": 4e-8, "snps": [snp("rs2109069", &["DPP9"])] }
        ]}})
    }

    #[test]
    fn test_variant_from_snp_link() {
        assert_eq!(
            variant_from_snp_link("https://x/api/singleNucleotidePolymorphisms/rs123{?projection}").as_deref(),
            Some("rs123")
        );
        assert_eq!(variant_from_snp_link("https://x/api/other/rs1"), None);
    }

    #[test]
    fn test_parse_flattens_contexts_and_drops_missing_or() {
        let records = parse_trait_associations(&body(), "COVID-19").unwrap();
        let genes: Vec<&str> = records.iter().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["LZTFL1", "SLC6A20", "DPP9"]);

        let dpp9 = &records[2];
        assert_eq!(dpp9.variant, "rs2109069");
        assert_eq!(dpp9.effect_size, 0.78);
        assert_eq!(dpp9.phenotype, "COVID-19");
        assert!(dpp9.disease_tags.contains("COVID-19"));
        assert_eq!(dpp9.source, Source::Overlay);
        assert!(!dpp9.is_risk());
    }

    #[test]
    fn test_repeated_associations_kept_once() {
        let assoc = |p: f64| {
            json!({ "orPerCopyNum": 1.2, "pvalue": p, "snps": [{
                "_links": { "snp": { "href": "https://x/singleNucleotidePolymorphisms/rs1{?projection}" } },
                "genomicContexts": [{ "gene": { "geneName": "TYK2" } }]
            }]})
        };
        let body = json!({ "_embedded": { "associations": [assoc(1e-8), assoc(1e-8), assoc(1e-6)] } });
        let records = parse_trait_associations(&body, "COVID-19").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].significance, 1e-8);
        assert_eq!(records[1].significance, 1e-6);
    }

    #[test]
    fn test_parse_missing_embedded() {
        assert!(parse_trait_associations(&json!({}), "COVID-19").is_err());
    }
}
