//! Association catalog CSV reader.
//!
//! Expects the PheWAS catalog column layout:
//! `gene_name, snp, phewas phenotype, p-value, odds-ratio, gwas-associations`.
//! Extra columns are ignored.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, instrument, warn};

use stargazer_common::entities::UNKNOWN_GENE;
use stargazer_common::{AssociationRecord, Result, Source, StargazerError};

/// Separator between labels in the `gwas-associations` column.
pub const ASSOCIATION_SEPARATOR: &str = ", ";

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "gene_name")]
    gene: Option<String>,
    snp: String,
    #[serde(rename = "phewas phenotype")]
    phenotype: String,
    /// Non-numeric cells such as `NA` read as missing
    #[serde(rename = "p-value", deserialize_with = "csv::invalid_option")]
    p_value: Option<f64>,
    #[serde(rename = "odds-ratio", deserialize_with = "csv::invalid_option")]
    odds_ratio: Option<f64>,
    #[serde(rename = "gwas-associations", default)]
    gwas_associations: Option<String>,
}

/// Outcome of loading one catalog file.
#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub records: Vec<AssociationRecord>,
    /// Rows dropped for a missing or non-positive odds ratio or p-value
    pub skipped: usize,
}

/// Splits a `gwas-associations` cell into its labels.
pub fn split_associations(cell: &str) -> BTreeSet<String> {
    cell.split(ASSOCIATION_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Read catalog rows from any reader.
pub fn read_catalog<R: Read>(reader: R, source: Source) -> Result<CatalogLoad> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut load = CatalogLoad::default();

    for (line, result) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        let row = result?;

        let effect_size = match row.odds_ratio {
            Some(or) if or.is_finite() && or > 0.0 => or,
            _ => {
                warn!(line = line + 2, snp = %row.snp, "Skipping catalog row without a positive odds ratio");
                load.skipped += 1;
                continue;
            }
        };
        let significance = match row.p_value {
            Some(p) if p.is_finite() && p >= 0.0 => p,
            _ => {
                warn!(line = line + 2, snp = %row.snp, "Skipping catalog row without a p-value");
                load.skipped += 1;
                continue;
            }
        };

        let gene = row
            .gene
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| UNKNOWN_GENE.to_string());

        load.records.push(AssociationRecord {
            gene,
            variant: row.snp,
            phenotype: row.phenotype,
            disease_tags: row
                .gwas_associations
                .as_deref()
                .map(split_associations)
                .unwrap_or_default(),
            effect_size,
            significance,
            source,
        });
    }

    Ok(load)
}

/// Load a catalog CSV from disk.
#[instrument(skip_all, fields(path = %path.display(), source = source.as_str()))]
pub fn load_catalog(path: &Path, source: Source) -> Result<CatalogLoad> {
    let file = std::fs::File::open(path).map_err(|e| {
        StargazerError::Config(format!("Cannot open catalog {}: {}", path.display(), e))
    })?;
    let load = read_catalog(std::io::BufReader::new(file), source)?;
    info!(records = load.records.len(), skipped = load.skipped, "Catalog loaded");
    Ok(load)
}
