//! Shared fixtures for StarGazer tests.

use stargazer_common::{AssociationRecord, Source};

/// Builder for an [`AssociationRecord`] with test-friendly defaults:
/// odds ratio 1.0, p-value 0.01, no disease tags, PheWAS source.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: AssociationRecord,
}

impl RecordBuilder {
    pub fn new(gene: &str, variant: &str, phenotype: &str) -> Self {
        Self {
            record: AssociationRecord {
                gene: gene.to_string(),
                variant: variant.to_string(),
                phenotype: phenotype.to_string(),
                disease_tags: Default::default(),
                effect_size: 1.0,
                significance: 0.01,
                source: Source::PheWas,
            },
        }
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.record.disease_tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn odds_ratio(mut self, or: f64) -> Self {
        self.record.effect_size = or;
        self
    }

    pub fn p(mut self, p: f64) -> Self {
        self.record.significance = p;
        self
    }

    pub fn source(mut self, source: Source) -> Self {
        self.record.source = source;
        self
    }

    pub fn build(self) -> AssociationRecord {
        self.record
    }
}

/// Untagged PheWAS record.
pub fn record(gene: &str, variant: &str, phenotype: &str, or: f64, p: f64) -> AssociationRecord {
    RecordBuilder::new(gene, variant, phenotype).odds_ratio(or).p(p).build()
}

/// One risk and one protective Asthma association, both significant at 0.05.
pub fn two_gene_asthma() -> Vec<AssociationRecord> {
    vec![
        record("GENE_A", "var1", "Asthma", 2.0, 0.01),
        record("GENE_B", "var2", "Asthma", 0.5, 0.04),
    ]
}

/// A small mixed corpus around Asthma:
///
/// | gene   | variants | direction  | co-occurs |
/// |--------|----------|------------|-----------|
/// | IL13   | 2        | risk       | one of two|
/// | ORMDL3 | 1        | risk       | yes       |
/// | GSDMB  | 1        | protective | no        |
/// | TSLP   | 1        | protective | yes       |
/// | FTO    | 1        | Obesity only, never selected |
///
/// GSDMB also carries a non-significant risk row (p = 0.3).
pub fn asthma_corpus() -> Vec<AssociationRecord> {
    vec![
        RecordBuilder::new("IL13", "rs20541", "Asthma").tags(&["Asthma"]).odds_ratio(1.5).p(0.001).build(),
        RecordBuilder::new("IL13", "rs1800925", "Asthma").odds_ratio(1.1).p(0.02).build(),
        RecordBuilder::new("ORMDL3", "rs7216389", "Asthma").tags(&["Asthma", "Crohn's disease"]).odds_ratio(2.0).p(1e-6).build(),
        RecordBuilder::new("GSDMB", "rs2305480", "Asthma").odds_ratio(0.8).p(0.01).build(),
        RecordBuilder::new("GSDMB", "rs11078927", "Asthma").odds_ratio(1.3).p(0.3).build(),
        RecordBuilder::new("TSLP", "rs1837253", "Allergic asthma").tags(&["Asthma"]).odds_ratio(0.6).p(0.005).build(),
        RecordBuilder::new("FTO", "rs9939609", "Obesity").tags(&["Obesity"]).odds_ratio(1.3).p(1e-8).build(),
    ]
}

/// Float comparison with an absolute tolerance of 1e-9.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
