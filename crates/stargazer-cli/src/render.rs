//! Plain-text tables for the terminal.

use std::collections::{BTreeMap, HashMap};

use stargazer_common::{AssociationRecord, DruggabilityTier, EnrichmentTerm, Evidence, SourceState};
use stargazer_ranker::features::FeatureRow;
use stargazer_ranker::{Feature, Partition, PrioritizationReport, RankedTable};

fn state_label(state: &SourceState) -> String {
    match state {
        SourceState::Available => "available".to_string(),
        SourceState::Unavailable { reason } => format!("unavailable ({reason})"),
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
}

fn features_line(features: &[Feature]) -> String {
    let labels: Vec<&str> = features.iter().map(|f| f.label()).collect();
    labels.join(", ")
}

pub fn report_header(report: &PrioritizationReport) {
    println!("StarGazer prioritization: {} (p <= {})", report.disease, report.threshold);
    println!("run {}  generated {}", report.run_id, report.generated_at.to_rfc3339());
    println!("  scored on: {}", features_line(&report.features));
    println!("  disease association: {}", state_label(&report.sources.disease_association));
    println!("  druggability:        {}", state_label(&report.sources.druggability));
    for (partition, state) in &report.sources.network {
        println!("  network ({partition}):{:width$}{}", "", state_label(state), width = 12usize.saturating_sub(partition.as_str().len()));
    }
}

pub fn ranked_table(table: &RankedTable, top_n: usize) {
    let title = match table.partition {
        Partition::Overall    => "Overall",
        Partition::Risk       => "Risk alleles (odds ratio >= 1)",
        Partition::Protective => "Protective alleles (odds ratio < 1)",
    };
    println!();
    println!("{title}: {} genes", table.genes.len());
    if table.is_empty() {
        println!("  (no genes)");
        return;
    }

    let mut header = format!("  {:<4} {:<14} {:>8}", "#", "gene", "score");
    for f in &table.features {
        header.push_str(&format!(" {:>20}", f.key()));
    }
    println!("{header}");

    for (rank, gene) in table.top(top_n).iter().enumerate() {
        let mut line = format!("  {:<4} {:<14} {:>8.3}", rank + 1, gene.gene, gene.aggregate_score);
        for f in &table.features {
            line.push_str(&format!(" {:>20}", cell(gene.normalized_value(*f))));
        }
        println!("{line}");
    }
}

pub fn tier_breakdown(tiers: &BTreeMap<Partition, BTreeMap<DruggabilityTier, usize>>) {
    println!();
    println!("Druggability (genes per tier)");
    print!("  {:<12}", "");
    for tier in DruggabilityTier::ALL.iter().rev() {
        print!(" {:>6}", tier.as_str());
    }
    println!();
    for (partition, counts) in tiers {
        print!("  {:<12}", partition.as_str());
        for tier in DruggabilityTier::ALL.iter().rev() {
            print!(" {:>6}", counts.get(tier).copied().unwrap_or(0));
        }
        println!();
    }
}

pub fn association_records(title: &str, records: &[&AssociationRecord]) {
    println!();
    println!("{title}: {} associations", records.len());
    if records.is_empty() {
        return;
    }
    println!("  {:<36} {:<12} {:<12} {:>8} {:>10}  gwas-associations", "phenotype", "gene", "snp", "OR", "p-value");
    for r in records {
        let tags: Vec<&str> = r.disease_tags.iter().map(String::as_str).collect();
        println!(
            "  {:<36} {:<12} {:<12} {:>8.3} {:>10.2e}  {}",
            truncate(&r.phenotype, 36),
            r.gene,
            r.variant,
            r.effect_size,
            r.significance,
            tags.join(", ")
        );
    }
}

pub fn feature_rows(title: &str, rows: &[FeatureRow]) {
    println!();
    println!("{title}: {} associations", rows.len());
    if rows.is_empty() {
        return;
    }
    println!("  {:<12} {:<12} {:>8} {:>10}  {:<7} phenotype", "gene", "snp", "OR", "p-value", "tier");
    for r in rows {
        println!(
            "  {:<12} {:<12} {:>8.3} {:>10.2e}  {:<7} {}",
            r.gene,
            r.variant,
            r.effect_size,
            r.significance,
            r.druggability_tier.as_str(),
            r.phenotype
        );
    }
}

pub fn degrees(partition: Partition, evidence: &Evidence<HashMap<String, u32>>) {
    println!();
    match evidence {
        Evidence::Unavailable(reason) => {
            println!("{partition} network: unavailable ({reason})");
        }
        Evidence::Available(degrees) => {
            println!("{partition} network: {} genes", degrees.len());
            let mut sorted: Vec<(&String, &u32)> = degrees.iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (gene, degree) in sorted {
                println!("  {gene:<14} {degree:>4}");
            }
        }
    }
}

/// Terms arrive most significant first.
pub fn enrichment(title: &str, evidence: &Evidence<Vec<EnrichmentTerm>>, top_n: usize) {
    println!();
    let terms = match evidence {
        Evidence::Unavailable(reason) => {
            println!("{title} enrichment: unavailable ({reason})");
            return;
        }
        Evidence::Available(terms) => terms,
    };
    println!("{title} enrichment: {} terms", terms.len());
    for t in terms.iter().take(top_n) {
        println!("  {}", enrichment_line(t));
    }
}

fn enrichment_line(t: &EnrichmentTerm) -> String {
    format!(
        "{:<10} {:<12} {:>9.2e}  {:<48} {}",
        t.category,
        t.term,
        t.fdr,
        truncate(&t.description, 48),
        t.genes.join(",")
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
