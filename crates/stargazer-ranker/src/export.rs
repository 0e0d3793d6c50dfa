//! CSV and JSON export of a prioritization report.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use stargazer_common::{Result, StargazerError};

use crate::pipeline::PrioritizationReport;
use crate::scorer::RankedTable;

/// Column header of the aggregate score.
pub const SCORE_COLUMN: &str = "stargazer_score";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    Json,
    #[default]
    Both,
}

impl ExportFormat {
    fn csv(&self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Both)
    }

    fn json(&self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::Both)
    }
}

impl FromStr for ExportFormat {
    type Err = StargazerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv"  => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "both" => Ok(ExportFormat::Both),
            other  => Err(StargazerError::Config(format!("unknown export format '{other}'"))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv  => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Both => "both",
        })
    }
}

/// Lowercase, with runs of other characters collapsed to `-`.
pub fn file_stem(disease: &str) -> String {
    let mut stem = String::with_capacity(disease.len());
    for c in disease.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }
    stem.trim_matches('-').to_string()
}

/// Ranked genes: gene, aggregate score, one normalised column per enabled
/// feature, variant count. Missing values are empty cells.
pub fn write_scores_csv<W: Write>(table: &RankedTable, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["gene".to_string(), SCORE_COLUMN.to_string()];
    header.extend(table.features.iter().map(|f| f.key().to_string()));
    header.push("variants".to_string());
    out.write_record(&header)?;

    for gene in &table.genes {
        let mut record = vec![gene.gene.clone(), gene.aggregate_score.to_string()];
        record.extend(
            table
                .features
                .iter()
                .map(|f| gene.normalized_value(*f).map(|v| v.to_string()).unwrap_or_default()),
        );
        record.push(gene.variants.to_string());
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Column header of the evidence file, in `FeatureRow` field order.
pub const EVIDENCE_COLUMNS: [&str; 12] = [
    "gene",
    "variant",
    "phenotype",
    "gwas_associations",
    "source",
    "effect_size",
    "significance",
    "disease_association",
    "co_occurrence",
    "druggability_tier",
    "druggability_score",
    "network_degree",
];

/// Raw per-record evidence of a partition. The header is written even when
/// the partition has no rows.
pub fn write_evidence_csv<W: Write>(table: &RankedTable, writer: W) -> Result<()> {
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    out.write_record(EVIDENCE_COLUMNS)?;
    for row in &table.rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_report_json<W: Write>(report: &PrioritizationReport, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Write the report into `dir`, creating it if needed. Returns the paths
/// written.
pub fn export_report(report: &PrioritizationReport, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let stem = file_stem(&report.disease);
    let mut written = Vec::new();

    if format.csv() {
        for table in report.tables() {
            let scores = dir.join(format!("{}_{}_scores.csv", stem, table.partition));
            write_scores_csv(table, BufWriter::new(File::create(&scores)?))?;
            written.push(scores);

            let evidence = dir.join(format!("{}_{}_evidence.csv", stem, table.partition));
            write_evidence_csv(table, BufWriter::new(File::create(&evidence)?))?;
            written.push(evidence);
        }
    }

    if format.json() {
        let path = dir.join(format!("{}_report.json", stem));
        let mut writer = BufWriter::new(File::create(&path)?);
        write_report_json(report, &mut writer)?;
        writer.flush()?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), run_id = %report.run_id, "Report exported");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::row;
    use crate::partition::Partition;
    use crate::scorer::score_partition;
    use crate::weights::{Feature, FeatureSet};

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Type 2 diabetes"), "type-2-diabetes");
        assert_eq!(file_stem("COVID-19"), "covid-19");
        assert_eq!(file_stem("Crohn's disease"), "crohn-s-disease");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_scores_csv_layout() {
        let features = FeatureSet::new([Feature::EffectSize, Feature::NetworkDegree]).unwrap();
        let table = score_partition(Partition::Risk, vec![row("IL13", 2.0), row("ORMDL3", 1.0)], &features);

        let mut buf = Vec::new();
        write_scores_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "gene,stargazer_score,effect_size,network_degree,variants");
        assert_eq!(lines[1], "IL13,0.5,1,0,1");
        assert_eq!(lines[2], "ORMDL3,0,0,0,1");
    }

    #[test]
    fn test_evidence_csv_has_header() {
        let table = score_partition(Partition::Overall, vec![row("IL13", 2.0)], &FeatureSet::default());
        let mut buf = Vec::new();
        write_evidence_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("gene,variant,phenotype,gwas_associations,source,effect_size"));
        assert!(text.contains("IL13,rs_IL13,Asthma,,phewas,2.0"));
    }

    #[test]
    fn test_empty_partition_evidence_is_header_only() {
        let table = score_partition(Partition::Protective, vec![], &FeatureSet::default());
        let mut buf = Vec::new();
        write_evidence_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, format!("{}\n", EVIDENCE_COLUMNS.join(",")));
    }

    #[test]
    fn test_evidence_header_matches_serialized_fields() {
        let table = score_partition(Partition::Overall, vec![row("IL13", 2.0)], &FeatureSet::default());
        let mut buf = Vec::new();
        write_evidence_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(',').count(), lines[1].split(',').count());
    }
}
