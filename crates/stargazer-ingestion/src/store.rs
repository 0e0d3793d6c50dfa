//! Unioned variant ↔ phenotype association table.
//!
//! Catalog rows and trait overlays are appended in load order. Nothing is
//! merged by key, so the same (gene, variant, phenotype) may appear once per
//! source.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use stargazer_common::AssociationRecord;

/// Threshold used when the caller's input is unusable.
pub const DEFAULT_P_VALUE: f64 = 0.05;

// ── Significance threshold ───────────────────────────────────────────────────

/// A p-value cut-off in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PValueThreshold(f64);

impl PValueThreshold {
    /// `None` when the value is outside (0, 1] or not finite.
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Decimal or scientific notation ("0.01", "5E-4", "3e-9").
    /// Anything unparseable or out of range becomes 0.05.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<f64>().ok().and_then(Self::new) {
            Some(t) => t,
            None => {
                debug!(input, default = DEFAULT_P_VALUE, "Unusable p-value threshold, using default");
                Self::default()
            }
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn admits(&self, significance: f64) -> bool {
        significance <= self.0
    }
}

impl Default for PValueThreshold {
    fn default() -> Self {
        Self(DEFAULT_P_VALUE)
    }
}

impl fmt::Display for PValueThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Study scope ──────────────────────────────────────────────────────────────

/// Which record fields a disease tag is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyScope {
    /// Phenotype field only
    PheWas,
    /// GWAS-association labels only
    Gwas,
    /// Either field
    #[default]
    Union,
    /// Both fields
    Intersection,
}

impl StudyScope {
    pub fn matches(&self, record: &AssociationRecord, tag: &str) -> bool {
        match self {
            StudyScope::PheWas       => record.phenotype_matches(tag),
            StudyScope::Gwas         => record.tags_match(tag),
            StudyScope::Union        => record.matches_disease(tag),
            StudyScope::Intersection => record.co_occurs(tag),
        }
    }
}

impl FromStr for StudyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phewas"       => Ok(StudyScope::PheWas),
            "gwas"         => Ok(StudyScope::Gwas),
            "union"        => Ok(StudyScope::Union),
            "intersection" => Ok(StudyScope::Intersection),
            other          => Err(format!("unknown study scope '{other}'")),
        }
    }
}

/// Strips a trailing parenthetical qualifier from a disease label:
/// "Asthma (childhood)" is queried as "Asthma".
pub fn disease_query_name(label: &str) -> &str {
    match label.find(" (") {
        Some(idx) => &label[..idx],
        None => label,
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AssociationStore {
    records: Vec<AssociationRecord>,
}

impl AssociationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<AssociationRecord>) -> Self {
        Self { records }
    }

    /// Appends a later-loaded source (catalog or overlay).
    pub fn append(&mut self, records: Vec<AssociationRecord>) {
        debug!(appended = records.len(), total = self.records.len() + records.len(), "Appending association records");
        self.records.extend(records);
    }

    pub fn records(&self) -> &[AssociationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose phenotype or GWAS labels contain `tag`.
    /// Case-sensitive; callers normalise case first.
    pub fn filter_by_disease(&self, tag: &str) -> Vec<&AssociationRecord> {
        self.filter_by_disease_in(tag, StudyScope::Union)
    }

    pub fn filter_by_disease_in(&self, tag: &str, scope: StudyScope) -> Vec<&AssociationRecord> {
        self.records.iter().filter(|r| scope.matches(r, tag)).collect()
    }

    /// Records with `significance <= threshold`.
    pub fn filter_by_significance(&self, threshold: PValueThreshold) -> Vec<&AssociationRecord> {
        self.records.iter().filter(|r| threshold.admits(r.significance)).collect()
    }

    /// Disease and significance filters in one pass, cloned for the query.
    pub fn select(&self, tag: &str, scope: StudyScope, threshold: PValueThreshold) -> Vec<AssociationRecord> {
        self.records
            .iter()
            .filter(|r| threshold.admits(r.significance) && scope.matches(r, tag))
            .cloned()
            .collect()
    }

    /// Selectable disease labels for a scope.
    pub fn diseases(&self, scope: StudyScope) -> BTreeSet<String> {
        let gwas = || -> BTreeSet<String> {
            self.records.iter().flat_map(|r| r.disease_tags.iter().cloned()).collect()
        };
        let phewas = || -> BTreeSet<String> {
            self.records.iter().map(|r| r.phenotype.clone()).collect()
        };
        match scope {
            StudyScope::Gwas   => gwas(),
            StudyScope::PheWas => phewas(),
            StudyScope::Union  => {
                let mut all = gwas();
                all.extend(phewas());
                all
            }
            StudyScope::Intersection => {
                let phe = phewas();
                gwas().into_iter().filter(|d| phe.contains(d)).collect()
            }
        }
    }

    pub fn genes(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.gene.as_str()).collect()
    }

    pub fn variants_of(&self, gene: &str) -> BTreeSet<&str> {
        self.records
            .iter()
            .filter(|r| r.gene == gene)
            .map(|r| r.variant.as_str())
            .collect()
    }

    pub fn records_for_gene(&self, gene: &str) -> Vec<&AssociationRecord> {
        self.records.iter().filter(|r| r.gene == gene).collect()
    }

    pub fn records_for_variant(&self, variant: &str) -> Vec<&AssociationRecord> {
        self.records.iter().filter(|r| r.variant == variant).collect()
    }
}

/// Splits records into (risk, protective) by effect direction.
pub fn split_by_direction<'a, I>(records: I) -> (Vec<&'a AssociationRecord>, Vec<&'a AssociationRecord>)
where
    I: IntoIterator<Item = &'a AssociationRecord>,
{
    records.into_iter().partition(|r| r.is_risk())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stargazer_test_utils::{record, RecordBuilder};

    fn store() -> AssociationStore {
        AssociationStore::from_records(vec![
            RecordBuilder::new("IL13", "rs20541", "Asthma").tags(&["Asthma", "Psoriasis"]).odds_ratio(1.4).p(0.001).build(),
            RecordBuilder::new("ORMDL3", "rs7216389", "Asthma").odds_ratio(0.8).p(0.04).build(),
            RecordBuilder::new("HLA-DQA1", "rs9272346", "Type 1 diabetes").tags(&["Asthma"]).odds_ratio(2.0).p(0.2).build(),
            record("FTO", "rs9939609", "Obesity", 1.3, 1e-8),
        ])
    }

    #[test]
    fn test_threshold_parse_accepts_scientific_notation() {
        assert_eq!(PValueThreshold::parse("5E-4").value(), 5e-4);
        assert_eq!(PValueThreshold::parse("3e-9").value(), 3e-9);
        assert_eq!(PValueThreshold::parse(" 0.01 ").value(), 0.01);
        assert_eq!(PValueThreshold::parse("1").value(), 1.0);
    }

    #[test]
    fn test_threshold_parse_falls_back_silently() {
        assert_eq!(PValueThreshold::parse("abc").value(), 0.05);
        assert_eq!(PValueThreshold::parse("").value(), 0.05);
        assert_eq!(PValueThreshold::parse("0").value(), 0.05);
        assert_eq!(PValueThreshold::parse("-0.01").value(), 0.05);
        assert_eq!(PValueThreshold::parse("1.5").value(), 0.05);
        assert_eq!(PValueThreshold::parse("NaN").value(), 0.05);
        assert_eq!(PValueThreshold::parse("inf").value(), 0.05);
    }

    #[test]
    fn test_filter_by_disease_matches_either_field() {
        let s = store();
        let genes: Vec<&str> = s.filter_by_disease("Asthma").iter().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["IL13", "ORMDL3", "HLA-DQA1"]);
        assert!(s.filter_by_disease("asthma").is_empty());
    }

    #[test]
    fn test_filter_by_disease_scopes() {
        let s = store();
        let genes = |scope| -> Vec<String> {
            s.filter_by_disease_in("Asthma", scope).iter().map(|r| r.gene.clone()).collect()
        };
        assert_eq!(genes(StudyScope::PheWas), vec!["IL13", "ORMDL3"]);
        assert_eq!(genes(StudyScope::Gwas), vec!["IL13", "HLA-DQA1"]);
        assert_eq!(genes(StudyScope::Intersection), vec!["IL13"]);
    }

    #[test]
    fn test_filter_by_significance_is_inclusive() {
        let s = store();
        let kept = s.filter_by_significance(PValueThreshold::new(0.04).unwrap());
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|r| r.significance <= 0.04));
    }

    #[test]
    fn test_select_applies_both_filters() {
        let s = store();
        let picked = s.select("Asthma", StudyScope::Union, PValueThreshold::default());
        let genes: Vec<&str> = picked.iter().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["IL13", "ORMDL3"]);
    }

    #[test]
    fn test_append_does_not_merge_by_key() {
        let mut s = store();
        let before = s.len();
        s.append(vec![record("IL13", "rs20541", "Asthma", 1.4, 0.001)]);
        assert_eq!(s.len(), before + 1);
        assert_eq!(s.records_for_variant("rs20541").len(), 2);
    }

    #[test]
    fn test_disease_lists() {
        let s = store();
        let gwas: Vec<String> = s.diseases(StudyScope::Gwas).into_iter().collect();
        assert_eq!(gwas, vec!["Asthma", "Psoriasis"]);
        let inter: Vec<String> = s.diseases(StudyScope::Intersection).into_iter().collect();
        assert_eq!(inter, vec!["Asthma"]);
        let union = s.diseases(StudyScope::Union);
        assert!(union.contains("Obesity"));
        assert!(union.contains("Psoriasis"));
        assert_eq!(union.len(), 4);
    }

    #[test]
    fn test_disease_query_name_strips_qualifier() {
        assert_eq!(disease_query_name("Asthma (childhood)"), "Asthma");
        assert_eq!(disease_query_name("COVID-19"), "COVID-19");
    }

    #[test]
    fn test_gene_and_variant_lookups() {
        let s = store();
        assert!(s.genes().contains("FTO"));
        assert_eq!(s.variants_of("IL13").into_iter().collect::<Vec<_>>(), vec!["rs20541"]);
        assert_eq!(s.records_for_gene("ORMDL3").len(), 1);
    }

    #[test]
    fn test_split_by_direction() {
        let s = store();
        let (risk, protective) = split_by_direction(s.records());
        assert_eq!(risk.len(), 3);
        assert_eq!(protective.len(), 1);
        assert_eq!(protective[0].gene, "ORMDL3");
    }

    #[test]
    fn test_study_scope_parse() {
        assert_eq!("GWAS".parse::<StudyScope>(), Ok(StudyScope::Gwas));
        assert!("both".parse::<StudyScope>().is_err());
    }
}
