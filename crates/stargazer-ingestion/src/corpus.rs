//! Builds the association store from the configured catalogs and overlays.

use tracing::{info, instrument, warn};

use stargazer_common::config::CatalogConfig;
use stargazer_common::{Result, Source, SourceState};

use crate::catalog::load_catalog;
use crate::sources::GwasCatalogClient;
use crate::store::AssociationStore;

#[derive(Debug, Default)]
pub struct CorpusLoad {
    pub store: AssociationStore,
    /// Catalog rows dropped for invalid effect size or p-value
    pub skipped: usize,
    /// Availability of each overlay by label
    pub overlays: Vec<(String, SourceState)>,
}

/// Load the PheWAS catalog, then extra catalogs, then overlays, in that
/// order. An unreadable catalog is fatal. A failed overlay is logged and
/// left out.
///
/// `gwas` is `None` when running offline; every overlay is then reported
/// unavailable.
#[instrument(skip_all)]
pub fn load_corpus(catalog: &CatalogConfig, gwas: Option<&GwasCatalogClient>) -> Result<CorpusLoad> {
    let mut corpus = CorpusLoad::default();

    let primary = load_catalog(&catalog.phewas_path, Source::PheWas)?;
    corpus.skipped += primary.skipped;
    corpus.store.append(primary.records);

    for extra in &catalog.extra {
        let load = load_catalog(&extra.path, extra.source)?;
        corpus.skipped += load.skipped;
        corpus.store.append(load.records);
    }

    for overlay in &catalog.overlays {
        let state = match gwas {
            None => SourceState::Unavailable { reason: "offline".to_string() },
            Some(client) => match client.trait_associations(overlay) {
                Ok(records) => {
                    corpus.store.append(records);
                    SourceState::Available
                }
                Err(e) => {
                    warn!(label = %overlay.label, error = %e, "Overlay unavailable, continuing without it");
                    SourceState::Unavailable { reason: e.to_string() }
                }
            },
        };
        corpus.overlays.push((overlay.label.clone(), state));
    }

    info!(records = corpus.store.len(), skipped = corpus.skipped, "Association corpus ready");
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use stargazer_common::config::{ExtraCatalog, OverlaySpec};

    const PHEWAS: &str = "\
snp,phewas phenotype,p-value,odds-ratio,gene_name,gwas-associations
rs20541,Asthma,0.001,1.4,IL13,Asthma
rs7216389,Asthma,0.04,0.8,ORMDL3,
";

    const GWAS: &str = "\
snp,phewas phenotype,p-value,odds-ratio,gene_name,gwas-associations
rs9939609,Obesity,1e-8,1.3,FTO,Obesity
";

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_catalogs_append_in_order_offline() {
        let phewas = write(PHEWAS);
        let gwas = write(GWAS);
        let config = CatalogConfig {
            phewas_path: phewas.path().to_path_buf(),
            extra: vec![ExtraCatalog { path: gwas.path().to_path_buf(), source: Source::Gwas }],
            overlays: vec![OverlaySpec { efo_id: "MONDO_0100096".to_string(), label: "COVID-19".to_string() }],
        };

        let corpus = load_corpus(&config, None).unwrap();
        let genes: Vec<&str> = corpus.store.records().iter().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["IL13", "ORMDL3", "FTO"]);
        assert_eq!(corpus.store.records()[2].source, Source::Gwas);
        assert_eq!(corpus.overlays.len(), 1);
        assert!(!corpus.overlays[0].1.is_available());
    }

    #[test]
    fn test_missing_primary_catalog_is_fatal() {
        let config = CatalogConfig {
            phewas_path: "/nonexistent/phewas.csv".into(),
            extra: vec![],
            overlays: vec![],
        };
        assert!(load_corpus(&config, None).is_err());
    }
}
